use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::entities::client::{ActiveModel as ClientActiveModel, Entity as Client, Model as ClientModel};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository};

#[derive(Debug)]
pub struct ClientRepository<'c, C> {
    base: BaseRepository<'c, C>,
}

impl<'c, C: ConnectionTrait> ClientRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        name: impl Into<String>,
        address: Option<String>,
    ) -> Result<ClientModel, ServiceError> {
        let name = name.into();
        if name.trim().is_empty() || name.chars().count() > 255 {
            return Err(ServiceError::ValidationError(
                "client name must be 1-255 characters".to_string(),
            ));
        }

        Ok(ClientActiveModel {
            name: Set(name),
            address: Set(address),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ClientModel>, ServiceError> {
        Ok(Client::find_by_id(id).one(self.base.get_db()).await?)
    }
}
