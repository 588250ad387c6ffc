//! Sheet naming.

/// Longest sheet name written to a workbook, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 30;

/// Characters the spreadsheet format does not allow in sheet names.
pub const RESERVED_CHARS: [char; 7] = ['\\', '/', '*', '?', ':', '[', ']'];

/// Replace reserved characters with spaces and truncate to
/// [`MAX_SHEET_NAME_LEN`] characters.
///
/// # Example
/// ```
/// use sectorlens_output::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("Э/ГЕНЕРАЦИЯ"), "Э ГЕНЕРАЦИЯ");
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { ' ' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// Sheet names already used in a workbook.
///
/// Two sector names can sanitize to the same sheet name (they may differ
/// only after the 30th character). The second one gets a `" (2)"` suffix,
/// the third `" (3)"`, and so on, with the base shortened to keep the total
/// within [`MAX_SHEET_NAME_LEN`]. Names compare case-insensitively, as the
/// spreadsheet format does.
#[derive(Debug, Clone, Default)]
pub struct SheetNames {
    taken: Vec<String>,
}

impl SheetNames {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// First free sheet name for `display_name`, without reserving it.
    pub fn next_free(&self, display_name: &str) -> String {
        let base = sanitize_sheet_name(display_name);
        if !self.is_taken(&base) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            let mut candidate: String = base.chars().take(keep).collect();
            candidate.push_str(&suffix);
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Reserve `name`.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.taken.push(name.into());
    }

    /// Whether `name` is already used.
    pub fn is_taken(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.taken.iter().any(|t| t.to_lowercase() == lower)
    }

    /// Reserved names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.taken
    }
}
