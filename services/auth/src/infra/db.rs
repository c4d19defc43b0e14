use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use signet_auth_schema::{otp_codes, users};

use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{Account, AccountStatus, OTP_MAX_ATTEMPTS, OtpPurpose, OtpRecord};
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(account_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(account_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(account_from_model).transpose()
    }

    async fn insert(&self, account: &Account) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(account.id),
            username: Set(account.username.clone()),
            email: Set(account.email.clone()),
            password_hash: Set(account.password_hash.clone()),
            status: Set(account.status.as_str().to_owned()),
            email_verified_at: Set(account.email_verified_at),
            created_at: Set(account.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert user")?;
        Ok(())
    }

    async fn activate(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            status: Set(AccountStatus::Active.as_str().to_owned()),
            email_verified_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("activate user")?;
        Ok(())
    }
}

fn account_from_model(model: users::Model) -> Result<Account, AuthServiceError> {
    let status = AccountStatus::parse(&model.status)
        .with_context(|| format!("unknown account status {:?}", model.status))?;
    Ok(Account {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        status,
        email_verified_at: model.email_verified_at,
        created_at: model.created_at,
    })
}

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn find_active(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError> {
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::UserId.eq(user_id))
            .filter(otp_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_codes::Column::ConsumedAt.is_null())
            .order_by_desc(otp_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find active otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn find_latest(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError> {
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::UserId.eq(user_id))
            .filter(otp_codes::Column::Purpose.eq(purpose.as_str()))
            .order_by_desc(otp_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn consume_all_and_insert(
        &self,
        record: &OtpRecord,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    lock_otp_pair(txn, record.user_id, record.purpose).await?;
                    consume_all_active(txn, record.user_id, record.purpose, now).await?;
                    insert_otp(txn, &record).await?;
                    Ok(())
                })
            })
            .await
            .context("consume and insert otp")?;
        Ok(())
    }

    async fn register_attempt(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        // Single conditional UPDATE: the bound and the unconsumed check are
        // re-evaluated inside the statement, so concurrent callers serialize
        // on the row and cannot both pass the limit.
        let result = otp_codes::Entity::update_many()
            .col_expr(
                otp_codes::Column::Attempts,
                Expr::col(otp_codes::Column::Attempts).add(1),
            )
            .filter(otp_codes::Column::Id.eq(id))
            .filter(otp_codes::Column::Attempts.lt(OTP_MAX_ATTEMPTS))
            .filter(otp_codes::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("register otp attempt")?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_consumed(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        let result = otp_codes::Entity::update_many()
            .col_expr(otp_codes::Column::ConsumedAt, Expr::value(now))
            .filter(otp_codes::Column::Id.eq(id))
            .filter(otp_codes::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark otp consumed")?;
        Ok(result.rows_affected > 0)
    }
}

/// Transaction-scoped advisory lock on the (user, purpose) pair. Under
/// READ COMMITTED, two racing supersede-and-insert transactions would not
/// see each other's uncommitted row and could both leave an active record;
/// the lock serializes them. Released automatically at commit or rollback.
async fn lock_otp_pair(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    purpose: OtpPurpose,
) -> Result<(), sea_orm::DbErr> {
    txn.execute(Statement::from_sql_and_values(
        txn.get_database_backend(),
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [format!("otp:{user_id}:{}", purpose.as_str()).into()],
    ))
    .await?;
    Ok(())
}

async fn consume_all_active(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    purpose: OtpPurpose,
    now: DateTime<Utc>,
) -> Result<u64, sea_orm::DbErr> {
    let result = otp_codes::Entity::update_many()
        .col_expr(otp_codes::Column::ConsumedAt, Expr::value(now))
        .filter(otp_codes::Column::UserId.eq(user_id))
        .filter(otp_codes::Column::Purpose.eq(purpose.as_str()))
        .filter(otp_codes::Column::ConsumedAt.is_null())
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

async fn insert_otp(txn: &DatabaseTransaction, record: &OtpRecord) -> Result<(), sea_orm::DbErr> {
    otp_codes::ActiveModel {
        id: Set(record.id),
        user_id: Set(record.user_id),
        purpose: Set(record.purpose.as_str().to_owned()),
        code_hash: Set(record.code_hash.clone()),
        created_at: Set(record.created_at),
        expires_at: Set(record.expires_at),
        consumed_at: Set(None),
        attempts: Set(0),
        last_sent_at: Set(record.last_sent_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn otp_from_model(model: otp_codes::Model) -> Result<OtpRecord, AuthServiceError> {
    let purpose = OtpPurpose::parse(&model.purpose)
        .with_context(|| format!("unknown otp purpose {:?}", model.purpose))?;
    Ok(OtpRecord {
        id: model.id,
        user_id: model.user_id,
        purpose,
        code_hash: model.code_hash,
        created_at: model.created_at,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        attempts: model.attempts,
        last_sent_at: model.last_sent_at,
    })
}
