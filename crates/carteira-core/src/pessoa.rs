//! # Pessoa
//!
//! Person records. Only `nome` is required; the remaining attributes are
//! optional and shape-checked when present.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entity::{field_matches, optional_field_matches, Entity, Filter, Identified};
use crate::error::ValidationError;
use crate::validate::{optional_text, required_text, Validate};

const NOME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const CPF_DIGITS: usize = 11;

/// A stored person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pessoa {
    /// Identifier assigned on create.
    pub id: i32,
    /// Full name.
    pub nome: String,
    /// Contact e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Brazilian taxpayer number, 11 digits with optional `.`/`-` punctuation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,
}

/// Body of a create or full-replace request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PessoaInput {
    /// Must be absent on create; must match the path on replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Full name.
    pub nome: String,
    /// Contact e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Brazilian taxpayer number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,
}

/// Body of a partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PessoaPatch {
    /// When present, must match the path id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// New full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// New e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New taxpayer number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// New date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,
}

/// Equality template over [`Pessoa`] fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PessoaFilter {
    /// Match on identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Match on exact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Match on exact e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Match on exact taxpayer number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Match on date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,
}

fn validate_email(email: Option<&str>) -> Result<(), ValidationError> {
    let Some(email) = email else {
        return Ok(());
    };
    optional_text("email", Some(email), EMAIL_MAX)?;
    let mut parts = email.trim().split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::Malformed {
            field: "email",
            value: email.to_string(),
            reason: "expected local@domain",
        }),
    }
}

fn validate_cpf(cpf: Option<&str>) -> Result<(), ValidationError> {
    let Some(cpf) = cpf else {
        return Ok(());
    };
    let digits: Vec<char> = cpf.chars().filter(|c| !matches!(c, '.' | '-')).collect();
    if digits.len() == CPF_DIGITS && digits.iter().all(char::is_ascii_digit) {
        Ok(())
    } else {
        Err(ValidationError::Malformed {
            field: "cpf",
            value: cpf.to_string(),
            reason: "expected 11 digits, optionally as XXX.XXX.XXX-XX",
        })
    }
}

fn validate_birth_date(date: Option<NaiveDate>) -> Result<(), ValidationError> {
    match date {
        Some(d) if d > Utc::now().date_naive() => Err(ValidationError::OutOfRange {
            field: "data_nascimento",
            expected: "a date not in the future",
        }),
        _ => Ok(()),
    }
}

impl Validate for PessoaInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required_text("nome", &self.nome, NOME_MAX)?;
        validate_email(self.email.as_deref())?;
        validate_cpf(self.cpf.as_deref())?;
        validate_birth_date(self.data_nascimento)
    }
}

impl Validate for PessoaPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        optional_text("nome", self.nome.as_deref(), NOME_MAX)?;
        validate_email(self.email.as_deref())?;
        validate_cpf(self.cpf.as_deref())?;
        validate_birth_date(self.data_nascimento)
    }
}

impl Identified for PessoaInput {
    fn claimed_id(&self) -> Option<i32> {
        self.id
    }
}

impl Identified for PessoaPatch {
    fn claimed_id(&self) -> Option<i32> {
        self.id
    }
}

impl Filter for PessoaFilter {
    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.nome.is_none()
            && self.email.is_none()
            && self.cpf.is_none()
            && self.data_nascimento.is_none()
    }
}

impl Entity for Pessoa {
    type Input = PessoaInput;
    type Patch = PessoaPatch;
    type Filter = PessoaFilter;

    const NAME: &'static str = "pessoa";
    const COLLECTION: &'static str = "pessoas";

    fn id(&self) -> i32 {
        self.id
    }

    fn from_input(id: i32, input: PessoaInput) -> Self {
        Self {
            id,
            nome: input.nome,
            email: input.email,
            cpf: input.cpf,
            data_nascimento: input.data_nascimento,
        }
    }

    fn apply_patch(&mut self, patch: PessoaPatch) {
        if let Some(nome) = patch.nome {
            self.nome = nome;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(cpf) = patch.cpf {
            self.cpf = Some(cpf);
        }
        if let Some(date) = patch.data_nascimento {
            self.data_nascimento = Some(date);
        }
    }

    fn matches(&self, filter: &PessoaFilter) -> bool {
        field_matches(filter.id.as_ref(), &self.id)
            && field_matches(filter.nome.as_deref(), self.nome.as_str())
            && optional_field_matches(filter.email.as_deref(), self.email.as_deref())
            && optional_field_matches(filter.cpf.as_deref(), self.cpf.as_deref())
            && optional_field_matches(filter.data_nascimento.as_ref(), self.data_nascimento.as_ref())
    }
}
