//! Schema history of the bookshelf service, oldest first.

use sqlx::PgPool;
use stepwise::prelude::*;

pub fn registry() -> MigrationRegistry<PgPool> {
    MigrationRegistry::new()
        .with(create_users())
        .with(create_orders())
        .with(create_feedbacks())
}

async fn execute_all(db: &PgPool, statements: &[&str]) -> Result<()> {
    for statement in statements {
        sqlx::query(statement).execute(db).await?;
    }
    Ok(())
}

fn create_users() -> Migration<PgPool> {
    Migration::new(
        "common-20251107100000-user",
        |db: &PgPool| {
            Box::pin(execute_all(
                db,
                &[
                    r#"
                    CREATE TABLE users (
                        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                        name VARCHAR(64),
                        email VARCHAR(255) UNIQUE,
                        role VARCHAR(64) DEFAULT 'customer'
                    )
                    "#,
                    "CREATE INDEX idx_users_created_at ON users (created_at)",
                    "CREATE INDEX idx_users_updated_at ON users (updated_at)",
                    "CREATE INDEX idx_users_name ON users (name)",
                ],
            ))
        },
        |db: &PgPool| Box::pin(drop_tables(db, &["users"])),
    )
}

fn create_orders() -> Migration<PgPool> {
    Migration::new(
        "common-20251107100000-order",
        |db: &PgPool| {
            Box::pin(execute_all(
                db,
                &[
                    r#"
                    CREATE TABLE orders (
                        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                        user_id VARCHAR(255),
                        amount INTEGER DEFAULT 0,
                        currency VARCHAR(10) DEFAULT 'usd'
                    )
                    "#,
                    "CREATE INDEX idx_orders_user_id ON orders (user_id)",
                ],
            ))
        },
        |db: &PgPool| Box::pin(drop_tables(db, &["orders"])),
    )
}

fn create_feedbacks() -> Migration<PgPool> {
    Migration::new(
        "common-20251107100000-feedback",
        |db: &PgPool| {
            Box::pin(execute_all(
                db,
                &[
                    r#"
                    CREATE TABLE feedbacks (
                        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                        user_id VARCHAR(255),
                        title VARCHAR(255),
                        rating INTEGER DEFAULT 0
                    )
                    "#,
                    "CREATE INDEX idx_feedbacks_user_id ON feedbacks (user_id)",
                    "CREATE INDEX idx_feedbacks_title ON feedbacks (title)",
                    r#"
                    CREATE TABLE feedback_contents (
                        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                        feedback_id VARCHAR(255),
                        content VARCHAR(4096)
                    )
                    "#,
                    "CREATE INDEX idx_feedback_contents_feedback_id ON feedback_contents (feedback_id)",
                ],
            ))
        },
        |db: &PgPool| Box::pin(drop_tables(db, &["feedbacks", "feedback_contents"])),
    )
}
