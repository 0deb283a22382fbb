use serde::Deserialize;

/// Lead record returned by `GET /{leadgen_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub field_data: Vec<LeadField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadField {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Form answers the CRM payload is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadContact {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
}

/// Lower-cases and folds whitespace runs into `_`, so `"Full Name"` matches `full_name`.
pub fn normalize_field_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

impl LeadData {
    /// First value of the field whose normalized name equals `key`, or `""`.
    pub fn field(&self, key: &str) -> &str {
        self.field_data
            .iter()
            .find(|f| normalize_field_name(&f.name) == key)
            .and_then(|f| f.values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn contact(&self) -> LeadContact {
        LeadContact {
            full_name: self.field("full_name").to_string(),
            email: self.field("email").to_string(),
            phone_number: self.field("phone_number").to_string(),
            city: self.field("city").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(fields: &[(&str, &[&str])]) -> LeadData {
        LeadData {
            id: "1".into(),
            created_time: None,
            field_data: fields
                .iter()
                .map(|(name, values)| LeadField {
                    name: name.to_string(),
                    values: values.iter().map(|v| v.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn display_names_match_snake_case_keys() {
        let lead = lead(&[("Full Name", &["Asha Verma"]), ("Phone  Number", &["+911234567890"])]);
        assert_eq!(lead.field("full_name"), "Asha Verma");
        assert_eq!(lead.field("phone_number"), "+911234567890");
    }

    #[test]
    fn missing_fields_and_empty_values_read_as_empty() {
        let lead = lead(&[("email", &[]), ("city", &["Mathura", "Agra"])]);
        assert_eq!(lead.field("email"), "");
        assert_eq!(lead.field("full_name"), "");
        assert_eq!(lead.field("city"), "Mathura");
    }

    #[test]
    fn contact_collects_the_four_fields() {
        let lead = lead(&[
            ("full_name", &["A B"]),
            ("EMAIL", &["a@b.c"]),
            ("phone_number", &["123"]),
            ("City", &["Delhi"]),
        ]);
        assert_eq!(
            lead.contact(),
            LeadContact {
                full_name: "A B".into(),
                email: "a@b.c".into(),
                phone_number: "123".into(),
                city: "Delhi".into(),
            }
        );
    }
}
