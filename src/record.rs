use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub i64);

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} \"{}\"", self.kind, self.value)
    }
}

impl std::error::Error for UnknownValue {}

// Closed enums share the same uid <-> variant mapping boilerplate.
macro_rules! uid_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $uid:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn uid(&self) -> &'static str {
                match self {
                    $($name::$variant => $uid),+
                }
            }

            pub fn label(&self) -> String {
                capitalize(self.uid())
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.uid().to_lowercase() == needle)
                    .ok_or_else(|| UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.uid())
            }
        }
    };
}

uid_enum!(Status, "status", {
    Active => "active",
    Cancelled => "cancelled",
    Expired => "expired",
});

uid_enum!(Category, "category", {
    Entertainment => "entertainment",
    Sports => "sports",
    News => "news",
    Lifestyle => "lifestyle",
    Technology => "technology",
    Finance => "finance",
    Politics => "politics",
    Professional => "professional",
    Other => "other",
});

uid_enum!(Frequency, "frequency", {
    Weekly => "weekly",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
});

uid_enum!(Currency, "currency", {
    Usd => "USD",
    Inr => "INR",
    Eur => "EUR",
});

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
            Currency::Eur => "€",
        }
    }
}

uid_enum!(ColumnId, "column", {
    Name => "name",
    Price => "price",
    Category => "category",
    Frequency => "frequency",
    StartDate => "startDate",
    Status => "status",
    Actions => "actions",
});

impl ColumnId {
    pub fn header(&self) -> &'static str {
        match self {
            ColumnId::Name => "NAME",
            ColumnId::Price => "PRICE",
            ColumnId::Category => "CATEGORY",
            ColumnId::Frequency => "FREQUENCY",
            ColumnId::StartDate => "START DATE",
            ColumnId::Status => "STATUS",
            ColumnId::Actions => "ACTIONS",
        }
    }

    pub fn sortable(&self) -> bool {
        !matches!(self, ColumnId::Actions)
    }

    /// Accepts the uid as well as its snake_case spelling (`start_date`).
    pub fn parse_lenient(s: &str) -> Result<Self, UnknownValue> {
        s.parse::<ColumnId>()
            .or_else(|_| s.replace('_', "").parse::<ColumnId>())
    }
}

/// One subscription. Never mutated by the engine; the whole collection is replaced instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub start_date: DateTime<Utc>,
    pub payment_method: String,
    pub status: Status,
}

impl Record {
    /// Render-ready text for one column of this record.
    pub fn cell(&self, column: ColumnId) -> String {
        match column {
            ColumnId::Name => self.name.clone(),
            ColumnId::Price => format!("{}{:.2}", self.currency.symbol(), self.price),
            ColumnId::Category => self.category.label(),
            ColumnId::Frequency => self.frequency.label(),
            ColumnId::StartDate => self.start_date.format("%b %-d, %Y").to_string(),
            ColumnId::Status => self.status.label(),
            ColumnId::Actions => "⋮".to_string(),
        }
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` and plain `YYYY-MM-DD`, all taken as UTC.
pub fn parse_start_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    name: &str,
    price: f64,
    frequency: Frequency,
    category: Category,
    (y, m, d): (i32, u32, u32),
    payment_method: &str,
    status: Status,
) -> Record {
    Record {
        id: RecordId(id),
        name: name.to_string(),
        price,
        currency: Currency::Usd,
        frequency,
        category,
        start_date: Utc
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or_default(),
        payment_method: payment_method.to_string(),
        status,
    }
}

/// The built-in subscriptions used when no data file is given.
pub fn sample_subscriptions() -> Vec<Record> {
    use Category::*;
    use Frequency::*;
    vec![
        sample(1, "Amazon Premium", 15.59, Monthly, Entertainment, (2025, 2, 11), "Credit Card", Status::Active),
        sample(2, "Netflix Standard", 15.49, Monthly, Entertainment, (2025, 1, 15), "PayPal", Status::Active),
        sample(3, "WSJ Digital", 39.99, Yearly, News, (2025, 3, 1), "Credit Card", Status::Active),
        sample(4, "Spotify Premium", 9.99, Monthly, Entertainment, (2024, 12, 1), "Debit Card", Status::Active),
        sample(5, "Apple News+", 9.99, Monthly, News, (2025, 2, 1), "Apple Pay", Status::Expired),
        sample(6, "LinkedIn Premium", 29.99, Monthly, Professional, (2025, 1, 20), "Credit Card", Status::Cancelled),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Active".parse::<Status>(), Ok(Status::Active));
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!(ColumnId::parse_lenient("start_date"), Ok(ColumnId::StartDate));
        assert_eq!(ColumnId::parse_lenient("startDate"), Ok(ColumnId::StartDate));
        let err = "sometimes".parse::<Frequency>().unwrap_err();
        assert_eq!(err.to_string(), "unknown frequency \"sometimes\"");
    }

    #[test]
    fn cells_are_formatted_for_display() {
        let records = sample_subscriptions();
        let amazon = &records[0];
        assert_eq!(amazon.cell(ColumnId::Price), "$15.59");
        let mut round = amazon.clone();
        round.price = 10.0;
        assert_eq!(round.cell(ColumnId::Price), "$10.00");
        round.price = 15.5;
        assert_eq!(round.cell(ColumnId::Price), "$15.50");
        assert_eq!(amazon.cell(ColumnId::Category), "Entertainment");
        assert_eq!(amazon.cell(ColumnId::StartDate), "Feb 11, 2025");
        assert_eq!(records[3].cell(ColumnId::StartDate), "Dec 1, 2024");
        assert_eq!(amazon.cell(ColumnId::Actions), "⋮");
    }

    #[test]
    fn start_dates_accept_several_layouts() {
        let expected = Utc.with_ymd_and_hms(2025, 2, 11, 0, 0, 0).unwrap();
        assert_eq!(parse_start_date("2025-02-11T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_start_date("2025-02-11 00:00:00"), Some(expected));
        assert_eq!(parse_start_date("2025-02-11"), Some(expected));
        assert_eq!(parse_start_date("11/02/2025"), None);
    }

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("cANCELLED"), "Cancelled");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn only_actions_is_unsortable() {
        let unsortable: Vec<_> = ColumnId::ALL.iter().filter(|c| !c.sortable()).collect();
        assert_eq!(unsortable, vec![&ColumnId::Actions]);
    }
}
