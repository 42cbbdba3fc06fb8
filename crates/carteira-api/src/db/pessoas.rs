//! Pessoa persistence operations on the `pessoa` table.

use carteira_core::Pessoa;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::Table;

impl Table for Pessoa {
    async fn insert(pool: &PgPool, record: &Self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO pessoa (id, nome, email, cpf, data_nascimento)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(&record.nome)
        .bind(&record.email)
        .bind(&record.cpf)
        .bind(record.data_nascimento)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn update(pool: &PgPool, record: &Self) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pessoa SET nome = $2, email = $3, cpf = $4, data_nascimento = $5
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.nome)
        .bind(&record.email)
        .bind(&record.cpf)
        .bind(record.data_nascimento)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pessoa WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PessoaRow>(
            "SELECT id, nome, email, cpf, data_nascimento FROM pessoa ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(PessoaRow::into_record).collect())
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PessoaRow {
    id: i32,
    nome: String,
    email: Option<String>,
    cpf: Option<String>,
    data_nascimento: Option<NaiveDate>,
}

impl PessoaRow {
    fn into_record(self) -> Pessoa {
        Pessoa {
            id: self.id,
            nome: self.nome,
            email: self.email,
            cpf: self.cpf,
            data_nascimento: self.data_nascimento,
        }
    }
}
