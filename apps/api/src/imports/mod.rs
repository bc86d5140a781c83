pub mod columns;
pub mod handlers;
pub mod runner;
pub mod sheet;
pub mod template;
pub mod validate;

/// Which catalog a bulk upload targets. Jobs and careers share the same
/// pipeline; only the column specs and the insert differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Jobs,
    Careers,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Jobs => "jobs",
            ImportKind::Careers => "careers",
        }
    }

    /// Table holding the category tree that `category` cells resolve against.
    pub fn category_table(self) -> &'static str {
        match self {
            ImportKind::Jobs => "job_categories",
            ImportKind::Careers => "career_categories",
        }
    }

    pub fn template_filename(self) -> &'static str {
        match self {
            ImportKind::Jobs => "job_import_template.xlsx",
            ImportKind::Careers => "career_import_template.xlsx",
        }
    }
}
