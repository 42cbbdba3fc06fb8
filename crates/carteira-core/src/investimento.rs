//! # Investimento
//!
//! Investment records. `descricao` and `valor` are required. The optional
//! `pessoa_id` names the owning [`crate::Pessoa`]; whether that record
//! exists is not checked here or anywhere else in the service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entity::{field_matches, optional_field_matches, Entity, Filter, Identified};
use crate::error::ValidationError;
use crate::validate::{optional_text, positive_id, required_text, Validate};

const DESCRICAO_MAX: usize = 255;
const TIPO_MAX: usize = 64;

/// A stored investment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Investimento {
    /// Identifier assigned on create.
    pub id: i32,
    /// What was invested in.
    pub descricao: String,
    /// Invested amount.
    pub valor: f64,
    /// Investment category, e.g. `CDB` or `Tesouro Selic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    /// Date the amount was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_aplicacao: Option<NaiveDate>,
    /// Owning person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessoa_id: Option<i32>,
}

/// Body of a create or full-replace request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvestimentoInput {
    /// Must be absent on create; must match the path on replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// What was invested in.
    pub descricao: String,
    /// Invested amount.
    pub valor: f64,
    /// Investment category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    /// Date the amount was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_aplicacao: Option<NaiveDate>,
    /// Owning person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessoa_id: Option<i32>,
}

/// Body of a partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct InvestimentoPatch {
    /// When present, must match the path id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    /// New amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor: Option<f64>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    /// New application date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_aplicacao: Option<NaiveDate>,
    /// New owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessoa_id: Option<i32>,
}

/// Equality template over [`Investimento`] fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvestimentoFilter {
    /// Match on identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Match on exact description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    /// Match on exact amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor: Option<f64>,
    /// Match on exact category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    /// Match on application date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_aplicacao: Option<NaiveDate>,
    /// Match on owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessoa_id: Option<i32>,
}

fn validate_valor(valor: Option<f64>) -> Result<(), ValidationError> {
    match valor {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::OutOfRange {
            field: "valor",
            expected: "a finite amount greater than or equal to 0",
        }),
        _ => Ok(()),
    }
}

impl Validate for InvestimentoInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required_text("descricao", &self.descricao, DESCRICAO_MAX)?;
        validate_valor(Some(self.valor))?;
        optional_text("tipo", self.tipo.as_deref(), TIPO_MAX)?;
        positive_id("pessoa_id", self.pessoa_id)
    }
}

impl Validate for InvestimentoPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        optional_text("descricao", self.descricao.as_deref(), DESCRICAO_MAX)?;
        validate_valor(self.valor)?;
        optional_text("tipo", self.tipo.as_deref(), TIPO_MAX)?;
        positive_id("pessoa_id", self.pessoa_id)
    }
}

impl Identified for InvestimentoInput {
    fn claimed_id(&self) -> Option<i32> {
        self.id
    }
}

impl Identified for InvestimentoPatch {
    fn claimed_id(&self) -> Option<i32> {
        self.id
    }
}

impl Filter for InvestimentoFilter {
    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.descricao.is_none()
            && self.valor.is_none()
            && self.tipo.is_none()
            && self.data_aplicacao.is_none()
            && self.pessoa_id.is_none()
    }
}

impl Entity for Investimento {
    type Input = InvestimentoInput;
    type Patch = InvestimentoPatch;
    type Filter = InvestimentoFilter;

    const NAME: &'static str = "investimento";
    const COLLECTION: &'static str = "investimentos";

    fn id(&self) -> i32 {
        self.id
    }

    fn from_input(id: i32, input: InvestimentoInput) -> Self {
        Self {
            id,
            descricao: input.descricao,
            valor: input.valor,
            tipo: input.tipo,
            data_aplicacao: input.data_aplicacao,
            pessoa_id: input.pessoa_id,
        }
    }

    fn apply_patch(&mut self, patch: InvestimentoPatch) {
        if let Some(descricao) = patch.descricao {
            self.descricao = descricao;
        }
        if let Some(valor) = patch.valor {
            self.valor = valor;
        }
        if let Some(tipo) = patch.tipo {
            self.tipo = Some(tipo);
        }
        if let Some(date) = patch.data_aplicacao {
            self.data_aplicacao = Some(date);
        }
        if let Some(owner) = patch.pessoa_id {
            self.pessoa_id = Some(owner);
        }
    }

    fn matches(&self, filter: &InvestimentoFilter) -> bool {
        field_matches(filter.id.as_ref(), &self.id)
            && field_matches(filter.descricao.as_deref(), self.descricao.as_str())
            && field_matches(filter.valor.as_ref(), &self.valor)
            && optional_field_matches(filter.tipo.as_deref(), self.tipo.as_deref())
            && optional_field_matches(filter.data_aplicacao.as_ref(), self.data_aplicacao.as_ref())
            && optional_field_matches(filter.pessoa_id.as_ref(), self.pessoa_id.as_ref())
    }
}
