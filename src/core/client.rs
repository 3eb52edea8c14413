//! Client business logic - lookups, find-or-create by phone, updates and deletion.
//!
//! The phone number is a client's natural identity. Creating an event for a phone that is
//! already on file attaches the event to that client, whatever name was supplied.

use crate::{
    core::activity::{self, Audited},
    entities::{ActivityCategory, Client, Event, client, event},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Outcome of [`find_or_create_client`].
#[derive(Debug, Clone)]
pub struct ClientResolution {
    /// The client the caller should use
    pub client: client::Model,
    /// Whether a new row was inserted
    pub created: bool,
}

/// Trims and validates a client's name and phone.
fn normalize_identity(name: &str, phone: &str) -> Result<(String, String)> {
    let name = name.trim();
    let phone = phone.trim();
    if name.is_empty() {
        return Err(Error::validation("Client name cannot be empty"));
    }
    if phone.is_empty() {
        return Err(Error::validation("Client phone cannot be empty"));
    }
    Ok((name.to_string(), phone.to_string()))
}

/// Retrieves all clients ordered by name.
pub async fn get_all_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>> {
    Client::find()
        .order_by_asc(client::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a client by id.
pub async fn get_client_by_id<C>(db: &C, client_id: i64) -> Result<Option<client::Model>>
where
    C: ConnectionTrait,
{
    Client::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a client by phone number (surrounding whitespace ignored).
pub async fn get_client_by_phone<C>(db: &C, phone: &str) -> Result<Option<client::Model>>
where
    C: ConnectionTrait,
{
    Client::find()
        .filter(client::Column::Phone.eq(phone.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the client with `phone`, inserting a new one named `name` if none exists.
///
/// An existing client keeps its stored name even if `name` differs.
pub async fn find_or_create_client<C>(db: &C, name: &str, phone: &str) -> Result<ClientResolution>
where
    C: ConnectionTrait,
{
    let (name, phone) = normalize_identity(name, phone)?;

    if let Some(existing) = get_client_by_phone(db, &phone).await? {
        if existing.name != name {
            tracing::debug!(
                client_id = existing.id,
                stored = %existing.name,
                supplied = %name,
                "phone matched an existing client with a different name"
            );
        }
        return Ok(ClientResolution {
            client: existing,
            created: false,
        });
    }

    let client = client::ActiveModel {
        name: Set(name),
        phone: Set(phone),
        notes: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(client_id = client.id, "created client");

    Ok(ClientResolution {
        client,
        created: true,
    })
}

/// Events belonging to a client, newest first.
pub async fn get_events_for_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<event::Model>> {
    Event::find()
        .filter(event::Column::ClientId.eq(client_id))
        .order_by_desc(event::Column::CreatedAt)
        .order_by_desc(event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a client's name, phone and notes.
///
/// Moving to a phone number that another client already uses is a conflict.
pub async fn update_client(
    db: &DatabaseConnection,
    client_id: i64,
    name: &str,
    phone: &str,
    notes: Option<String>,
) -> Result<Audited<client::Model>> {
    let (name, phone) = normalize_identity(name, phone)?;

    let existing = get_client_by_id(db, client_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Client",
            id: client_id,
        })?;

    if let Some(other) = get_client_by_phone(db, &phone).await? {
        if other.id != client_id {
            return Err(Error::Conflict {
                message: format!("Phone {phone} already belongs to client {}", other.id),
            });
        }
    }

    let mut model: client::ActiveModel = existing.into();
    model.name = Set(name);
    model.phone = Set(phone);
    model.notes = Set(notes.unwrap_or_default());
    let updated = model.update(db).await?;

    let warning = activity::record(
        db,
        ActivityCategory::ClientUpdate,
        format!("Client {} updated", updated.name),
        Some(updated.id),
    )
    .await;
    Ok(Audited::new(updated).with_warning(warning))
}

/// Deletes a client that has no events.
///
/// Returns `None` when the client does not exist. Clients with events are refused so
/// events never point at a missing client.
pub async fn delete_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Option<Audited<String>>> {
    let Some(existing) = get_client_by_id(db, client_id).await? else {
        return Ok(None);
    };

    let event_count = Event::find()
        .filter(event::Column::ClientId.eq(client_id))
        .count(db)
        .await?;
    if event_count > 0 {
        return Err(Error::Conflict {
            message: format!(
                "Client {} still has {event_count} event(s); delete them first",
                existing.name
            ),
        });
    }

    Client::delete_by_id(client_id).exec(db).await?;
    tracing::info!(client_id, "deleted client");

    let warning = activity::record(
        db,
        ActivityCategory::ClientDelete,
        format!("Client {} deleted", existing.name),
        Some(client_id),
    )
    .await;
    Ok(Some(Audited::new(existing.name).with_warning(warning)))
}
