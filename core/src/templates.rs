//! Path templates for Fineract's metadata ("template") endpoints.
//!
//! Templates carry `{}` placeholders filled left to right with resource ids.
//! Arity is not checked: surplus arguments are ignored and unfilled
//! placeholders are left as they are.

use std::fmt::Display;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;

pub const TEMPLATES: &[(&str, &str)] = &[
    ("clients", "clients/template"),
    ("groups", "groups/template"),
    ("loanproducts", "loanproducts/template"),
    ("loanproducts_mix", "loanproducts/template?isProductMixTemplate=true"),
    ("loans", "loans/template?clientId={}"),
    ("loan_transactions", "loans/{}/transactions/template"),
    ("charges", "charges/template"),
    ("offices", "offices/template"),
    ("users", "users/template"),
    ("hooks", "hooks/template"),
    ("audits", "audits/searchtemplate"),
    ("markercheckers", "markercheckers/searchtemplate"),
    ("reports", "reports/template"),
    ("accountingrules", "accountingrules/template"),
    ("savingproducts", "savingproducts/template"),
    ("savingsaccounts", "savingsaccounts/template?clientId={}"),
    ("savingsaccounts_transactions", "savingsaccounts/{}/transactions/template"),
    ("standinginstructions", "standinginstructions/template"),
    ("accounttransfers", "accounttransfers/template"),
];

pub fn template(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, path)| *path)
}

pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(at) = rest.find("{}") {
        rendered.push_str(&rest[..at]);
        match args.next() {
            Some(arg) => rendered.push_str(&arg.to_string()),
            None => rendered.push_str("{}"),
        }
        rest = &rest[at + 2..];
    }
    rendered.push_str(rest);
    rendered
}

/// Fetch the metadata behind the template registered as `name`.
pub fn fetch_template(
    handler: &Arc<RequestHandler>,
    name: &str,
    args: &[&dyn Display],
) -> Result<Value> {
    let path = template(name).ok_or_else(|| ApiError::UnknownTemplate(name.to_string()))?;
    handler.get(&format!("/{}", render(path, args)), &[])
}
