//! Per-row validation for bulk imports. Row failures are collected, never
//! thrown: an invalid row contributes exactly one `{row, field, reason}`
//! entry and the batch keeps going.

use std::collections::HashMap;

use crate::imports::sheet::Sheet;
use crate::imports::ImportKind;
use crate::models::import::RowError;

#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub salary_range: String,
    pub location: String,
    pub job_type: String,
    pub experience_required: String,
    pub education_required: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerDraft {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub education_required: String,
    pub experience_required: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub future_prospect: Option<String>,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowDraft {
    Job(JobDraft),
    Career(CareerDraft),
}

/// A row that passed validation, tagged with its spreadsheet position so a
/// later insert failure can still be reported against the right row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    pub number: u32,
    pub draft: RowDraft,
}

/// Header check. Any hit here is fatal: the whole upload is rejected before
/// row processing starts.
pub fn missing_columns(kind: ImportKind, sheet: &Sheet) -> Vec<RowError> {
    kind.required_columns()
        .filter(|name| !sheet.headers.iter().any(|h| h == name))
        .map(|name| RowError {
            row: 0,
            field: Some(name.to_string()),
            reason: "missing required column".to_string(),
        })
        .collect()
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

struct RowView<'a> {
    columns: &'a HashMap<&'a str, usize>,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    fn get(&self, name: &str) -> &'a str {
        self.columns
            .get(name)
            .and_then(|&i| self.cells.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    fn optional(&self, name: &str) -> Option<String> {
        let v = self.get(name);
        (!v.is_empty()).then(|| v.to_string())
    }
}

/// Validates every data row against the kind's column specs and resolves
/// category names to ids. Returns the buildable rows and one error per
/// rejected row (the first failing check wins).
pub fn validate_rows(
    kind: ImportKind,
    sheet: &Sheet,
    categories: &HashMap<String, i64>,
) -> (Vec<ValidRow>, Vec<RowError>) {
    let columns: HashMap<&str, usize> = sheet
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut valid = Vec::new();
    let mut errors = Vec::new();

    'rows: for row in &sheet.rows {
        let view = RowView {
            columns: &columns,
            cells: &row.cells,
        };

        for name in kind.required_columns() {
            if view.get(name).is_empty() {
                errors.push(RowError::field(row.number, name, "required"));
                continue 'rows;
            }
        }

        let category_name = view.get("category");
        let Some(&category_id) = categories.get(category_name) else {
            errors.push(RowError::field(
                row.number,
                "category",
                format!("unknown category '{category_name}'"),
            ));
            continue;
        };

        let draft = match kind {
            ImportKind::Jobs => RowDraft::Job(JobDraft {
                title: view.get("title").to_string(),
                company: view.get("company").to_string(),
                description: view.get("description").to_string(),
                requirements: view.get("requirements").to_string(),
                skills: split_list(view.get("skills")),
                benefits: split_list(view.get("benefits")),
                salary_range: view.get("salary_range").to_string(),
                location: view.get("location").to_string(),
                job_type: view.get("job_type").to_string(),
                experience_required: view.get("experience_required").to_string(),
                education_required: view.get("education_required").to_string(),
                category_id,
            }),
            ImportKind::Careers => {
                let bound = |name: &str| -> Result<Option<i64>, RowError> {
                    match view.optional(name) {
                        None => Ok(None),
                        Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                            RowError::field(row.number, name, "must be a whole number")
                        }),
                    }
                };
                let salary_min = match bound("salary_min") {
                    Ok(v) => v,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };
                let salary_max = match bound("salary_max") {
                    Ok(v) => v,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };
                RowDraft::Career(CareerDraft {
                    title: view.get("title").to_string(),
                    description: view.get("description").to_string(),
                    required_skills: split_list(view.get("required_skills")),
                    education_required: view.get("education_required").to_string(),
                    experience_required: view.get("experience_required").to_string(),
                    salary_min,
                    salary_max,
                    future_prospect: view.optional("future_prospect"),
                    category_id,
                })
            }
        };

        valid.push(ValidRow {
            number: row.number,
            draft,
        });
    }

    (valid, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::sheet::SheetRow;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, cells)| {
                    let mut cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
                    cells.resize(headers.len(), String::new());
                    SheetRow {
                        number: i as u32 + 2,
                        cells,
                    }
                })
                .collect(),
        }
    }

    fn career_categories() -> HashMap<String, i64> {
        HashMap::from([("Data & Analytics".to_string(), 7)])
    }

    const CAREER_HEADERS: &[&str] = &[
        "title",
        "description",
        "required_skills",
        "education_required",
        "experience_required",
        "category",
        "salary_min",
        "salary_max",
        "future_prospect",
    ];

    fn career_row<'a>(title: &'a str) -> Vec<&'a str> {
        vec![
            title,
            "Pipelines",
            "SQL,Python",
            "bachelor",
            "2-4 years",
            "Data & Analytics",
            "60000",
            "95000",
            "growing",
        ]
    }

    #[test]
    fn test_valid_career_rows() {
        let row_a = career_row("Data Engineer");
        let row_b = career_row("Analytics Engineer");
        let s = sheet(CAREER_HEADERS, &[&row_a, &row_b]);
        let (valid, errors) = validate_rows(ImportKind::Careers, &s, &career_categories());
        assert!(errors.is_empty());
        assert_eq!(valid.len(), 2);
        let RowDraft::Career(draft) = &valid[0].draft else {
            panic!("expected a career draft");
        };
        assert_eq!(draft.title, "Data Engineer");
        assert_eq!(draft.required_skills, vec!["SQL", "Python"]);
        assert_eq!(draft.salary_min, Some(60000));
        assert_eq!(draft.category_id, 7);
        assert_eq!(valid[0].number, 2);
    }

    #[test]
    fn test_missing_required_field_is_one_error() {
        // A row can fail several checks; only the first is recorded so a
        // batch with K bad rows yields exactly K error entries.
        let mut bad = career_row("");
        bad[1] = ""; // description empty too
        let good = career_row("Data Engineer");
        let s = sheet(CAREER_HEADERS, &[&bad, &good]);
        let (valid, errors) = validate_rows(ImportKind::Careers, &s, &career_categories());
        assert_eq!(valid.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], RowError::field(2, "title", "required"));
    }

    #[test]
    fn test_unknown_category() {
        let mut row = career_row("Data Engineer");
        row[5] = "No Such Category";
        let s = sheet(CAREER_HEADERS, &[&row]);
        let (valid, errors) = validate_rows(ImportKind::Careers, &s, &career_categories());
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("category"));
        assert!(errors[0].reason.contains("No Such Category"));
    }

    #[test]
    fn test_non_numeric_salary_bound() {
        let mut row = career_row("Data Engineer");
        row[6] = "sixty thousand";
        let s = sheet(CAREER_HEADERS, &[&row]);
        let (valid, errors) = validate_rows(ImportKind::Careers, &s, &career_categories());
        assert!(valid.is_empty());
        assert_eq!(errors[0].field.as_deref(), Some("salary_min"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let headers = &CAREER_HEADERS[..6]; // no salary/prospect columns
        let full_row = career_row("Data Engineer");
        let row = &full_row[..6];
        let s = sheet(headers, &[row]);
        let (valid, errors) = validate_rows(ImportKind::Careers, &s, &career_categories());
        assert!(errors.is_empty());
        let RowDraft::Career(draft) = &valid[0].draft else {
            panic!("expected a career draft");
        };
        assert_eq!(draft.salary_min, None);
        assert_eq!(draft.future_prospect, None);
    }

    #[test]
    fn test_missing_columns_fatal() {
        let s = sheet(&["title", "description"], &[]);
        let fatal = missing_columns(ImportKind::Careers, &s);
        let fields: Vec<_> = fatal.iter().map(|e| e.field.as_deref().unwrap()).collect();
        assert!(fields.contains(&"required_skills"));
        assert!(fields.contains(&"category"));
        assert!(fatal.iter().all(|e| e.row == 0));
    }

    #[test]
    fn test_job_sheet_with_one_empty_title() {
        // Three rows, the second with an empty title: 2 valid, 1 error,
        // and the error pinpoints {row: 3 data row index 2, field, reason}.
        let headers = &[
            "title",
            "company",
            "description",
            "requirements",
            "salary_range",
            "location",
            "job_type",
            "category",
            "experience_required",
            "education_required",
            "skills",
        ];
        let full = |title: &'static str| -> Vec<&'static str> {
            vec![
                title,
                "Acme",
                "desc",
                "reqs",
                "90k-120k",
                "Berlin",
                "full_time",
                "Software",
                "3-5 years",
                "bachelor",
                "Rust,SQL",
            ]
        };
        let row1 = full("Backend Engineer");
        let row2 = full("");
        let row3 = full("Platform Engineer");
        let s = sheet(headers, &[&row1, &row2, &row3]);
        let categories = HashMap::from([("Software".to_string(), 1)]);

        let (valid, errors) = validate_rows(ImportKind::Jobs, &s, &categories);
        assert_eq!(valid.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], RowError::field(3, "title", "required"));

        let RowDraft::Job(draft) = &valid[0].draft else {
            panic!("expected a job draft");
        };
        assert_eq!(draft.skills, vec!["Rust", "SQL"]);
        assert_eq!(draft.category_id, 1);
    }
}
