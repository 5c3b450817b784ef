use chrono::{DateTime, Datelike, FixedOffset};

const MONTHS_PT_BR: [&str; 12] = ["jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez"];

/// `15 mar 2021`
pub fn format_date(date_time: &DateTime<FixedOffset>) -> String {
    let month = MONTHS_PT_BR[date_time.month0() as usize];
    format!("{:02} {} {}", date_time.day(), month, date_time.year())
}

/// `(15 mar 2021, 19:25)`
pub fn format_date_time(date_time: &DateTime<FixedOffset>) -> (String, String) {
    let date = format_date(date_time);
    let time = date_time.format("%H:%M").to_string();
    (date, time)
}

/// `* editado em 19 mar 2021, às 15:49`
pub fn format_edited(date_time: &DateTime<FixedOffset>) -> String {
    let (date, time) = format_date_time(date_time);
    format!("* editado em {}, às {}", date, time)
}

pub fn format_optional_date(date_time: Option<&DateTime<FixedOffset>>) -> String {
    date_time.map(format_date).unwrap_or_default()
}
