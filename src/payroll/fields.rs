use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical lead fields that record-store column headers resolve onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeadField {
    SubmittedAt,
    AppointmentAt,
    Status,
    HomeownerName,
    Address,
    Agent,
}

impl LeadField {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::SubmittedAt,
            Self::AppointmentAt,
            Self::Status,
            Self::HomeownerName,
            Self::Address,
            Self::Agent,
        ]
    }

    /// Header spellings seen across exports, highest priority first.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::SubmittedAt => &[
                "Date Submitted",
                "Submitted At",
                "Submission Date",
                "Date Created",
                "Created At",
                "Timestamp",
            ],
            Self::AppointmentAt => &[
                "Appointment Date /Time",
                "Appointment Date/Time",
                "Appointment Date / Time",
                "Appointment Date",
                "Appointment Time",
                "Appointment",
            ],
            Self::Status => &["Status", "Lead Status", "Appointment Status"],
            Self::HomeownerName => &[
                "Homeowner Name(s)",
                "Homeowner Name",
                "Homeowner Names",
                "Homeowner",
                "Customer Name",
            ],
            Self::Address => &["Address", "Property Address", "Homeowner Address"],
            Self::Agent => &["Agent", "Agent Name", "Agent Email", "Setter", "Submitted By"],
        }
    }
}

static ALIAS_TABLE: OnceLock<HashMap<String, (LeadField, usize)>> = OnceLock::new();

fn alias_table() -> &'static HashMap<String, (LeadField, usize)> {
    ALIAS_TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for field in LeadField::ordered() {
            for (priority, alias) in field.aliases().iter().enumerate() {
                table.entry(normalize_header(alias)).or_insert((field, priority));
            }
        }
        table
    })
}

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Resolves a single header, returning the field and its alias priority.
pub fn resolve_header(header: &str) -> Option<(LeadField, usize)> {
    alias_table().get(&normalize_header(header)).copied()
}

/// Column layout for one export, built once from its header row.
#[derive(Debug, Clone, Default)]
pub struct FieldLayout {
    columns: HashMap<LeadField, Vec<(usize, usize)>>,
}

impl FieldLayout {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns: HashMap<LeadField, Vec<(usize, usize)>> = HashMap::new();
        for (index, header) in headers.into_iter().enumerate() {
            if let Some((field, priority)) = resolve_header(header) {
                columns.entry(field).or_default().push((priority, index));
            }
        }
        for candidates in columns.values_mut() {
            candidates.sort_unstable();
        }
        Self { columns }
    }

    pub fn has(&self, field: LeadField) -> bool {
        self.columns.contains_key(&field)
    }

    /// First non-empty value for `field`, trying columns in alias order.
    pub fn value<'r, F>(&self, field: LeadField, cell: F) -> Option<&'r str>
    where
        F: Fn(usize) -> Option<&'r str>,
    {
        self.columns
            .get(&field)?
            .iter()
            .filter_map(|(_, index)| cell(*index))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}
