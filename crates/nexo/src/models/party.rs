//! Related entities printed on a document: client, project and the issuing company.

use serde::{Deserialize, Serialize};

use crate::utils::de::string_or_empty;

/// Client display fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    #[serde(default, alias = "company_name")]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub trade_name: Option<String>,
    #[serde(default, alias = "nif", alias = "cif")]
    pub tax_id: Option<String>,
    #[serde(default, alias = "billing_address")]
    pub address: Option<String>,
    #[serde(default, alias = "billing_city")]
    pub city: Option<String>,
    #[serde(default, alias = "billing_postal_code")]
    pub postal_code: Option<String>,
    #[serde(default, alias = "billing_province")]
    pub province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientRecord {
    /// Name printed in the client block.
    pub fn display_name(&self) -> &str {
        self.legal_name
            .as_deref()
            .or(self.trade_name.as_deref())
            .unwrap_or("")
    }
}

/// Project display fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default, alias = "name")]
    pub project_name: Option<String>,
    #[serde(default, alias = "project_number")]
    pub number: Option<String>,
    #[serde(default, alias = "project_address")]
    pub address: Option<String>,
    #[serde(default, alias = "project_city")]
    pub city: Option<String>,
    /// Venue or local name where the event takes place.
    #[serde(default)]
    pub local_name: Option<String>,
    /// Purchase order number supplied by the client.
    #[serde(default)]
    pub client_order_number: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

impl ProjectRecord {
    /// Whether any field besides the id would be printed.
    pub fn has_display_fields(&self) -> bool {
        [
            &self.project_name,
            &self.number,
            &self.address,
            &self.city,
            &self.local_name,
            &self.client_order_number,
            &self.site_name,
        ]
        .iter()
        .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Legal identity of the issuing company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub commercial_name: Option<String>,
    #[serde(default, alias = "nif", alias = "cif")]
    pub tax_id: Option<String>,
    #[serde(default, alias = "fiscal_address")]
    pub address: Option<String>,
    #[serde(default, alias = "fiscal_city")]
    pub city: Option<String>,
    #[serde(default, alias = "fiscal_postal_code")]
    pub postal_code: Option<String>,
    #[serde(default, alias = "fiscal_province")]
    pub province: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanySettings {
    pub fn display_name(&self) -> &str {
        self.commercial_name
            .as_deref()
            .or(self.legal_name.as_deref())
            .unwrap_or("")
    }
}

/// A bank account printed in the payment block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub iban: String,
    #[serde(default, alias = "swift")]
    pub bic: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Company preferences relevant to document output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyPreferences {
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    /// Legal footer printed at the bottom of every invoice.
    #[serde(default)]
    pub invoice_footer: Option<String>,
    /// Conditions printed at the bottom of every quote.
    #[serde(default)]
    pub quote_conditions: Option<String>,
}

impl CompanyPreferences {
    /// Bank accounts to print, default account first.
    pub fn printable_accounts(&self) -> Vec<&BankAccount> {
        let mut accounts: Vec<&BankAccount> = self
            .bank_accounts
            .iter()
            .filter(|a| !a.iban.trim().is_empty())
            .collect();
        accounts.sort_by_key(|a| !a.is_default);
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_display_fields() {
        let empty = ProjectRecord {
            id: "p1".into(),
            site_name: Some("  ".into()),
            ..Default::default()
        };
        assert!(!empty.has_display_fields());

        let venue = ProjectRecord {
            id: "p1".into(),
            local_name: Some("Palau de Congressos".into()),
            ..Default::default()
        };
        assert!(venue.has_display_fields());
    }

    #[test]
    fn default_account_printed_first() {
        let prefs = CompanyPreferences {
            bank_accounts: vec![
                BankAccount {
                    iban: "ES11".into(),
                    ..Default::default()
                },
                BankAccount {
                    iban: String::new(),
                    is_default: true,
                    ..Default::default()
                },
                BankAccount {
                    iban: "ES22".into(),
                    is_default: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let ibans: Vec<&str> = prefs
            .printable_accounts()
            .iter()
            .map(|a| a.iban.as_str())
            .collect();
        assert_eq!(ibans, vec!["ES22", "ES11"]);
    }

    #[test]
    fn account_without_iban_does_not_break_preferences() {
        let prefs: CompanyPreferences = serde_json::from_value(serde_json::json!({
            "bank_accounts": [
                {"bank_name": "Caixa", "iban": null},
                {"iban": "ES11"}
            ]
        }))
        .unwrap();
        assert_eq!(prefs.bank_accounts.len(), 2);
        assert_eq!(prefs.bank_accounts[0].iban, "");
        let ibans: Vec<&str> = prefs
            .printable_accounts()
            .iter()
            .map(|a| a.iban.as_str())
            .collect();
        assert_eq!(ibans, vec!["ES11"]);
    }

    #[test]
    fn client_decodes_aliases() {
        let client: ClientRecord = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "company_name": "Eventos Norte SL",
            "nif": "B12345678",
            "billing_city": "Bilbao"
        }))
        .unwrap();
        assert_eq!(client.display_name(), "Eventos Norte SL");
        assert_eq!(client.tax_id.as_deref(), Some("B12345678"));
        assert_eq!(client.city.as_deref(), Some("Bilbao"));
    }
}
