//! Spreadsheet column specifications for bulk imports. One source of truth
//! used by validation, template generation and the columns endpoint.

use serde::Serialize;

use crate::imports::ImportKind;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
    pub example: &'static str,
}

const fn col(
    name: &'static str,
    required: bool,
    description: &'static str,
    example: &'static str,
) -> ColumnSpec {
    ColumnSpec {
        name,
        required,
        description,
        example,
    }
}

/// Columns of a job import sheet. List-valued columns are comma-separated.
pub const JOB_COLUMNS: &[ColumnSpec] = &[
    col("title", true, "Job title", "Backend Engineer"),
    col("company", true, "Company name", "Acme Corp"),
    col("description", true, "What the role involves", "Build and run the core platform..."),
    col("requirements", true, "What the role expects", "3+ years building web services..."),
    col("salary_range", true, "Advertised salary range", "90k-120k"),
    col("location", true, "Work location", "Berlin"),
    col("job_type", true, "full_time / part_time / internship", "full_time"),
    col("category", true, "Job category name (must already exist)", "Software Development"),
    col("experience_required", true, "Experience expectation", "3-5 years"),
    col("education_required", true, "Education expectation", "bachelor"),
    col("skills", false, "Comma-separated skills", "Rust,PostgreSQL,Kubernetes"),
    col("benefits", false, "Comma-separated benefits", "Remote budget,Annual bonus"),
];

/// Columns of a career import sheet.
pub const CAREER_COLUMNS: &[ColumnSpec] = &[
    col("title", true, "Career title", "Data Engineer"),
    col("description", true, "What this career is about", "Design and operate data pipelines..."),
    col("required_skills", true, "Comma-separated skills", "SQL,Python,Airflow"),
    col("education_required", true, "Education expectation", "bachelor"),
    col("experience_required", true, "Experience expectation", "2-4 years"),
    col("category", true, "Career category name (must already exist)", "Data & Analytics"),
    col("salary_min", false, "Lower salary bound, annual", "60000"),
    col("salary_max", false, "Upper salary bound, annual", "95000"),
    col("future_prospect", false, "Outlook label", "growing"),
];

impl ImportKind {
    pub fn columns(self) -> &'static [ColumnSpec] {
        match self {
            ImportKind::Jobs => JOB_COLUMNS,
            ImportKind::Careers => CAREER_COLUMNS,
        }
    }

    pub fn required_columns(self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().filter(|c| c.required).map(|c| c.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_unique() {
        for kind in [ImportKind::Jobs, ImportKind::Careers] {
            let mut names: Vec<_> = kind.columns().iter().map(|c| c.name).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), kind.columns().len());
        }
    }

    #[test]
    fn test_required_columns_subset() {
        assert!(ImportKind::Jobs.required_columns().count() < JOB_COLUMNS.len());
        assert!(ImportKind::Careers
            .required_columns()
            .any(|name| name == "category"));
    }
}
