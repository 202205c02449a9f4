use crate::domain::model::Member;
use chrono::{Datelike, NaiveDate};

const HEADER: &str = "Сегодня день рождения празднуют:";
const NO_BIRTHDAYS: &str = "Сегодня именинников нет 😔";
const CLOSING: &str = "💐 Присоединяйтесь к поздравлениям в комментариях!\n🎂 Желаем счастья, здоровья и успехов!";

/// True when a `DD.MM` or `DD.MM.YYYY` birth date falls on `today`. The year
/// is ignored; missing or malformed dates never match.
pub fn is_birthday_today(bdate: Option<&str>, today: NaiveDate) -> bool {
    let Some(bdate) = bdate else {
        return false;
    };

    let mut parts = bdate.split('.');
    let (Some(day), Some(month)) = (parts.next(), parts.next()) else {
        return false;
    };

    match (day.trim().parse::<u32>(), month.trim().parse::<u32>()) {
        (Ok(day), Ok(month)) => day == today.day() && month == today.month(),
        _ => false,
    }
}

pub fn birthday_people(members: &[Member], today: NaiveDate) -> Vec<Member> {
    members
        .iter()
        .filter(|m| is_birthday_today(m.bdate.as_deref(), today))
        .cloned()
        .collect()
}

/// Post text for today. `date` is the short form, e.g. "18 октября".
pub fn compose_post(people: &[Member], date: &str) -> String {
    if people.is_empty() {
        return format!("📅 {}\n\n{}", date, NO_BIRTHDAYS);
    }

    let mut text = format!("🎉 {}\n\n{}\n\n", date, HEADER);
    for person in people {
        text.push_str(&person.mention());
        text.push('\n');
    }
    text.push('\n');
    text.push_str(CLOSING);
    text
}
