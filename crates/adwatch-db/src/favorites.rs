//! Database operations for `favorites`.

use adwatch_core::Favorites;
use sqlx::SqlitePool;

use crate::DbError;

/// Loads the saved favorites in the order they were first added.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_favorites(pool: &SqlitePool) -> Result<Favorites, DbError> {
    let ids = sqlx::query_scalar::<_, String>("SELECT ad_id FROM favorites ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    Ok(Favorites::new(ids))
}

/// Persists every id in `favorites`. Ids already saved are left as they are;
/// nothing is removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the transaction is rolled
/// back.
pub async fn save_favorites(pool: &SqlitePool, favorites: &Favorites) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for id in favorites.ids() {
        sqlx::query("INSERT INTO favorites (ad_id) VALUES (?1) ON CONFLICT (ad_id) DO NOTHING")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
