//! View navigation: which week or day the calendar shows, and whether the
//! grid or the flat appointment list is on screen.

use chrono::{Duration, NaiveDate};

use super::time::{navigate_week, week_start};

/// A grid anchor: the Monday of the visible week, or the single visible day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridView {
    Week(NaiveDate),
    Day(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Grid(GridView),
    List,
}

/// Owns the current view. The grid anchor survives a trip through the list
/// view, so toggling back lands on the week or day the user left.
#[derive(Debug, Clone)]
pub struct CalendarNav {
    current: CalendarView,
    last_grid: GridView,
}

impl CalendarNav {
    /// Start on today's week (or day), per the configured default grid kind
    pub fn new(today: NaiveDate, day_grid: bool) -> Self {
        let grid = if day_grid {
            GridView::Day(today)
        } else {
            GridView::Week(week_start(today))
        };
        Self {
            current: CalendarView::Grid(grid),
            last_grid: grid,
        }
    }

    pub fn view(&self) -> CalendarView {
        self.current
    }

    /// The active grid anchor, or the one the list view would return to
    pub fn grid(&self) -> GridView {
        match self.current {
            CalendarView::Grid(g) => g,
            CalendarView::List => self.last_grid,
        }
    }

    pub fn previous(&mut self) {
        self.step(-1);
    }

    pub fn next(&mut self) {
        self.step(1);
    }

    fn step(&mut self, direction: i64) {
        if let CalendarView::Grid(grid) = self.current {
            let moved = match grid {
                GridView::Week(ws) => GridView::Week(navigate_week(ws, direction)),
                GridView::Day(d) => GridView::Day(d + Duration::days(direction)),
            };
            self.current = CalendarView::Grid(moved);
            self.last_grid = moved;
        }
    }

    /// Re-enter the last-active grid kind anchored at `date`
    pub fn select_date(&mut self, date: NaiveDate) {
        let grid = match self.last_grid {
            GridView::Week(_) => GridView::Week(week_start(date)),
            GridView::Day(_) => GridView::Day(date),
        };
        self.current = CalendarView::Grid(grid);
        self.last_grid = grid;
    }

    /// Flip between the appointment list and the grid view last active
    pub fn toggle_list(&mut self) {
        self.current = match self.current {
            CalendarView::List => CalendarView::Grid(self.last_grid),
            CalendarView::Grid(_) => CalendarView::List,
        };
    }

    /// Switch between week and day grids, converting the anchor
    pub fn set_day_grid(&mut self, day_grid: bool) {
        let grid = match (self.last_grid, day_grid) {
            (GridView::Week(ws), true) => GridView::Day(ws),
            (GridView::Day(d), false) => GridView::Week(week_start(d)),
            (grid, _) => grid,
        };
        self.current = CalendarView::Grid(grid);
        self.last_grid = grid;
    }

    /// The Monday-aligned week to fetch for the current view; the list view
    /// fetches unbounded.
    pub fn fetch_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.current {
            CalendarView::Grid(GridView::Week(ws)) => Some((ws, ws + Duration::days(6))),
            CalendarView::Grid(GridView::Day(d)) => {
                let ws = week_start(d);
                Some((ws, ws + Duration::days(6)))
            }
            CalendarView::List => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
    }

    #[test]
    fn starts_on_the_current_week() {
        let nav = CalendarNav::new(tuesday(), false);
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(nav.view(), CalendarView::Grid(GridView::Week(monday)));
    }

    #[test]
    fn next_then_previous_returns_to_the_anchor() {
        let mut week_nav = CalendarNav::new(tuesday(), false);
        let before = week_nav.grid();
        week_nav.next();
        week_nav.previous();
        assert_eq!(week_nav.grid(), before);

        let mut day_nav = CalendarNav::new(tuesday(), true);
        day_nav.previous();
        day_nav.next();
        assert_eq!(day_nav.grid(), GridView::Day(tuesday()));
    }

    #[test]
    fn day_grid_steps_by_single_days() {
        let mut nav = CalendarNav::new(tuesday(), true);
        nav.next();
        assert_eq!(nav.grid(), GridView::Day(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()));
    }

    #[test]
    fn toggling_the_list_preserves_the_grid_anchor() {
        let mut nav = CalendarNav::new(tuesday(), false);
        nav.next();
        let anchor = nav.grid();

        nav.toggle_list();
        assert_eq!(nav.view(), CalendarView::List);
        // Stepping has no effect while the list is up
        nav.next();
        assert_eq!(nav.view(), CalendarView::List);

        nav.toggle_list();
        assert_eq!(nav.view(), CalendarView::Grid(anchor));
    }

    #[test]
    fn select_date_reanchors_the_last_grid_kind() {
        let mut nav = CalendarNav::new(tuesday(), false);
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        nav.select_date(sunday);
        // Week view anchors at the Monday on or before the date
        assert_eq!(nav.grid(), GridView::Week(NaiveDate::from_ymd_opt(2026, 7, 27).unwrap()));

        nav.set_day_grid(true);
        nav.toggle_list();
        nav.select_date(tuesday());
        assert_eq!(nav.view(), CalendarView::Grid(GridView::Day(tuesday())));
    }

    #[test]
    fn fetch_range_covers_the_anchored_week() {
        let mut nav = CalendarNav::new(tuesday(), true);
        let (from, to) = nav.fetch_range().unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 8, 9).unwrap());

        nav.toggle_list();
        assert_eq!(nav.fetch_range(), None);
    }
}
