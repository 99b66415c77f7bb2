use crate::models::{Boundary, DateWindow, Granularity, Mode, YearMonth};
use chrono::{Duration, Local, NaiveDate};

/// Number of months covered by the default stats window, current month included.
const TRAILING_MONTHS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One input, used by the rankings page.
    Single,
    /// Start and end inputs, used by the stats page.
    Range,
}

/// Derives the default input state for a page from `today` and the mode.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeController {
    layout: Layout,
    today: NaiveDate,
}

impl DateRangeController {
    pub fn new(layout: Layout, today: NaiveDate) -> Self {
        Self { layout, today }
    }

    pub fn today(layout: Layout) -> Self {
        Self::new(layout, Local::now().date_naive())
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Monthly defaults: this month, or the trailing window ending this month.
    pub fn initial(&self) -> DateWindow {
        let this_month = YearMonth::of(self.today);
        let (start, end) = match self.layout {
            Layout::Single => (this_month, None),
            Layout::Range => (
                this_month.shifted(1 - TRAILING_MONTHS),
                Some(Boundary::Month(this_month)),
            ),
        };
        window(Granularity::Month, Some(Boundary::Month(start)), end)
    }

    pub fn for_mode(&self, mode: Mode) -> DateWindow {
        match mode {
            Mode::MonthlyBetting => self.initial(),
            Mode::DailyBetting => match self.layout {
                Layout::Single => {
                    let yesterday = self.today - Duration::days(1);
                    window(Granularity::Date, Some(Boundary::Day(yesterday)), None)
                }
                Layout::Range => {
                    let this_month = YearMonth::of(self.today);
                    window(
                        Granularity::Date,
                        this_month.first_day().map(Boundary::Day),
                        this_month.last_day().map(Boundary::Day),
                    )
                }
            },
        }
    }
}

/// Last calendar day of `month` (1-indexed) in `year`.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    YearMonth::new(year, month)?.last_day()
}

fn window(granularity: Granularity, start: Option<Boundary>, end: Option<Boundary>) -> DateWindow {
    DateWindow::from_calendar(granularity, start, end)
}
