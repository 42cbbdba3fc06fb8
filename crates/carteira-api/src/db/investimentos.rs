//! Investimento persistence operations on the `investimento` table.
//!
//! `pessoa_id` has no foreign key; a row may name a person that was
//! never stored or has since been deleted.

use carteira_core::Investimento;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::Table;

impl Table for Investimento {
    async fn insert(pool: &PgPool, record: &Self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO investimento (id, descricao, valor, tipo, data_aplicacao, pessoa_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(&record.descricao)
        .bind(record.valor)
        .bind(&record.tipo)
        .bind(record.data_aplicacao)
        .bind(record.pessoa_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn update(pool: &PgPool, record: &Self) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE investimento
             SET descricao = $2, valor = $3, tipo = $4, data_aplicacao = $5, pessoa_id = $6
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.descricao)
        .bind(record.valor)
        .bind(&record.tipo)
        .bind(record.data_aplicacao)
        .bind(record.pessoa_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM investimento WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, InvestimentoRow>(
            "SELECT id, descricao, valor, tipo, data_aplicacao, pessoa_id
             FROM investimento ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(InvestimentoRow::into_record).collect())
    }
}

#[derive(sqlx::FromRow)]
struct InvestimentoRow {
    id: i32,
    descricao: String,
    valor: f64,
    tipo: Option<String>,
    data_aplicacao: Option<NaiveDate>,
    pessoa_id: Option<i32>,
}

impl InvestimentoRow {
    fn into_record(self) -> Investimento {
        Investimento {
            id: self.id,
            descricao: self.descricao,
            valor: self.valor,
            tipo: self.tipo,
            data_aplicacao: self.data_aplicacao,
            pessoa_id: self.pessoa_id,
        }
    }
}
