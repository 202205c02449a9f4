use crate::domain::ports::Clock;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};

/// Hours east of UTC for every "today" decision (Krasnoyarsk time).
pub const UTC_OFFSET_HOURS: i32 = 7;

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub fn bot_offset() -> FixedOffset {
    // 7h is well inside the ±24h range FixedOffset accepts.
    FixedOffset::east_opt(UTC_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

/// Wall clock shifted into the bot's fixed offset, independent of the host
/// timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&bot_offset())
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Midday on the given date in the bot's offset.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(12, 0, 0)?;
        let instant = naive.and_local_timezone(bot_offset()).single()?;
        Some(Self(instant))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

pub fn today(clock: &dyn Clock) -> NaiveDate {
    clock.now().date_naive()
}

fn month_name(date: &impl Datelike) -> &'static str {
    MONTHS_GENITIVE[date.month0() as usize]
}

/// "18 октября", used in the post header.
pub fn format_short(date: &impl Datelike) -> String {
    format!("{} {}", date.day(), month_name(date))
}

/// "18 октября 2026 г.", stored in the lock file and compared verbatim.
pub fn format_long(date: &impl Datelike) -> String {
    format!("{} {} {} г.", date.day(), month_name(date), date.year())
}

/// "18.10.2026, 13:45:07", for log lines.
pub fn format_timestamp(instant: &DateTime<FixedOffset>) -> String {
    instant.format("%d.%m.%Y, %H:%M:%S").to_string()
}
