//! Definition set replacement and queries for the repository.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{DiscoveryCycle, Repository};
use crate::domain::{Order, Strategy, StrategyDefinition, StrategyId};

fn decode_err(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

fn address_to_db(address: &Address) -> String {
    format!("{:#x}", address)
}

fn address_from_db(column: &str, value: &str) -> Result<Address, sqlx::Error> {
    Address::from_str(value)
        .map_err(|e| decode_err(format!("bad address in column {}: {}", column, e)))
}

fn uint_from_db<T: FromStr>(column: &str, value: &str) -> Result<T, sqlx::Error>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| decode_err(format!("bad integer in column {}: {}", column, e)))
}

fn definition_from_row(row: &SqliteRow) -> Result<StrategyDefinition, sqlx::Error> {
    let id = U256::from_str_radix(&row.get::<String, _>("strategy_id"), 10)
        .map_err(|e| decode_err(format!("bad strategy_id: {}", e)))?;

    let orders = [
        Order {
            y: uint_from_db("y0", &row.get::<String, _>("y0"))?,
            z: uint_from_db("z0", &row.get::<String, _>("z0"))?,
            a: uint_from_db("a0", &row.get::<String, _>("a0"))?,
            b: uint_from_db("b0", &row.get::<String, _>("b0"))?,
        },
        Order {
            y: uint_from_db("y1", &row.get::<String, _>("y1"))?,
            z: uint_from_db("z1", &row.get::<String, _>("z1"))?,
            a: uint_from_db("a1", &row.get::<String, _>("a1"))?,
            b: uint_from_db("b1", &row.get::<String, _>("b1"))?,
        },
    ];

    Ok(StrategyDefinition {
        controller: address_from_db("controller", &row.get::<String, _>("controller"))?,
        strategy: Strategy {
            id: StrategyId::new(id),
            owner: address_from_db("owner", &row.get::<String, _>("owner"))?,
            tokens: [
                address_from_db("token0", &row.get::<String, _>("token0"))?,
                address_from_db("token1", &row.get::<String, _>("token1"))?,
            ],
            orders,
        },
    })
}

impl Repository {
    /// Atomically replace the stored definition set with a new discovery
    /// cycle's output. All-or-nothing: a failure leaves the previous set.
    ///
    /// # Errors
    /// Returns an error if any statement in the transaction fails.
    pub async fn replace_definitions(
        &self,
        definitions: &[StrategyDefinition],
        completed_at_ms: i64,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM definitions")
            .execute(&mut *tx)
            .await?;

        for definition in definitions {
            let strategy = &definition.strategy;
            sqlx::query(
                r#"
                INSERT INTO definitions
                (controller, strategy_id, owner, token0, token1,
                 y0, z0, a0, b0, y1, z1, a1, b1)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(address_to_db(&definition.controller))
            .bind(strategy.id.as_u256().to_string())
            .bind(address_to_db(&strategy.owner))
            .bind(address_to_db(&strategy.tokens[0]))
            .bind(address_to_db(&strategy.tokens[1]))
            .bind(strategy.orders[0].y.to_string())
            .bind(strategy.orders[0].z.to_string())
            .bind(strategy.orders[0].a.to_string())
            .bind(strategy.orders[0].b.to_string())
            .bind(strategy.orders[1].y.to_string())
            .bind(strategy.orders[1].z.to_string())
            .bind(strategy.orders[1].a.to_string())
            .bind(strategy.orders[1].b.to_string())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO discovery_cycles (completed_at_ms, definition_count) VALUES (?, ?)",
        )
        .bind(completed_at_ms)
        .bind(definitions.len() as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// The full stored definition set, ordered by strategy id.
    ///
    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn list_definitions(&self) -> Result<Vec<StrategyDefinition>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM definitions ORDER BY CAST(strategy_id AS INTEGER)")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(definition_from_row).collect()
    }

    /// Stored definitions owned by `owner` as of the last discovery cycle.
    ///
    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn definitions_for_owner(
        &self,
        owner: &Address,
    ) -> Result<Vec<StrategyDefinition>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM definitions WHERE owner = ? ORDER BY CAST(strategy_id AS INTEGER)",
        )
        .bind(address_to_db(owner))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(definition_from_row).collect()
    }

    /// The most recently completed discovery cycle, if any.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn latest_cycle(&self) -> Result<Option<DiscoveryCycle>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, completed_at_ms, definition_count FROM discovery_cycles ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DiscoveryCycle {
            id: row.get("id"),
            completed_at_ms: row.get("completed_at_ms"),
            definition_count: row.get("definition_count"),
        }))
    }
}
