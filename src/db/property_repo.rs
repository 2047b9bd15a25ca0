// src/db/property_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::property::{Property, PropertyImage, PropertyType},
};
use rust_decimal::Decimal;

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        address: &str,
        city: &str,
        commune: Option<&str>,
        region: Option<&str>,
        price: Decimal,
        bedrooms: i32,
        bathrooms: i32,
        property_type: PropertyType,
    ) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties
                (owner_id, title, address, city, commune, region, price, bedrooms, bathrooms, type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'AVAILABLE')
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(address)
        .bind(city)
        .bind(commune)
        .bind(region)
        .bind(price)
        .bind(bedrooms)
        .bind(bathrooms)
        .bind(property_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(property)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(property)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    pub async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    // IDs de propiedades del dueño, para validar el alcance solicitado
    pub async fn ids_owned_by(&self, owner_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM properties WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // Marca la propiedad como gestionada por el corredor
    pub async fn assign_broker(&self, property_id: Uuid, broker_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE properties
            SET broker_id = $2, status = 'MANAGED', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .bind(broker_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Libera la propiedad cuando la gestión termina
    pub async fn release_broker(&self, property_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE properties
            SET broker_id = NULL, status = 'AVAILABLE', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_images(&self, property_id: Uuid) -> Result<Vec<PropertyImage>, AppError> {
        let images = sqlx::query_as::<_, PropertyImage>(
            "SELECT * FROM property_images WHERE property_id = $1 ORDER BY position ASC",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    pub async fn add_image(
        &self,
        property_id: Uuid,
        url: &str,
        position: i32,
    ) -> Result<PropertyImage, AppError> {
        let image = sqlx::query_as::<_, PropertyImage>(
            r#"
            INSERT INTO property_images (property_id, url, position)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(url)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;
        Ok(image)
    }
}
