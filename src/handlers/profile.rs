use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::StorefrontApi;
use crate::domain::profile::{Address, AddressType, UserProfile};
use crate::errors::{AppError, ErrorBody};

use super::identity::Caller;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

impl From<AddressKind> for AddressType {
    fn from(kind: AddressKind) -> Self {
        match kind {
            AddressKind::Home => AddressType::Home,
            AddressKind::Work => AddressType::Work,
            AddressKind::Other => AddressType::Other,
        }
    }
}

impl From<AddressType> for AddressKind {
    fn from(kind: AddressType) -> Self {
        match kind {
            AddressType::Home => AddressKind::Home,
            AddressType::Work => AddressKind::Work,
            AddressType::Other => AddressKind::Other,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressBody {
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
    pub line1: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<AddressBody> for Address {
    fn from(body: AddressBody) -> Self {
        Address {
            kind: body.kind.into(),
            line1: body.line1,
            city: body.city,
            state: body.state,
            zip: body.zip,
            phone: body.phone.filter(|p| !p.trim().is_empty()),
        }
    }
}

impl From<Address> for AddressBody {
    fn from(address: Address) -> Self {
        AddressBody {
            kind: address.kind.into(),
            line1: address.line1,
            city: address.city,
            state: address.state,
            zip: address.zip,
            phone: address.phone,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub addresses: Vec<AddressBody>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        ProfileResponse {
            user_id: profile.user_id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            addresses: profile.addresses.into_iter().map(AddressBody::from).collect(),
        }
    }
}

/// GET /profile
#[utoipa::path(
    get,
    path = "/profile",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    responses(
        (status = 200, description = "Profile and address book", body = ProfileResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
    ),
    tag = "profile"
)]
pub async fn get_profile(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let profile = web::block(move || api.profile(caller.identity())).await??;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// PUT /profile
#[utoipa::path(
    put,
    path = "/profile",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 422, description = "Missing name or invalid phone", body = ErrorBody),
    ),
    tag = "profile"
)]
pub async fn update_profile(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let profile =
        web::block(move || api.update_contact(caller.identity(), &req.name, req.phone.trim()))
            .await??;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// POST /profile/addresses
#[utoipa::path(
    post,
    path = "/profile/addresses",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = AddressBody,
    responses(
        (status = 201, description = "Address saved", body = ProfileResponse),
        (status = 422, description = "Incomplete address or invalid phone", body = ErrorBody),
    ),
    tag = "profile"
)]
pub async fn add_address(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<AddressBody>,
) -> Result<HttpResponse, AppError> {
    let address = Address::from(body.into_inner());
    let profile = web::block(move || api.add_address(caller.identity(), address)).await??;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// DELETE /profile/addresses/{index}
#[utoipa::path(
    delete,
    path = "/profile/addresses/{index}",
    params(
        ("index" = usize, Path, description = "Position in the address book"),
        ("X-User-Id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Address removed", body = ProfileResponse),
        (status = 404, description = "No address at that position", body = ErrorBody),
    ),
    tag = "profile"
)]
pub async fn remove_address(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    path: web::Path<usize>,
) -> Result<HttpResponse, AppError> {
    let index = path.into_inner();
    let profile = web::block(move || api.remove_address(caller.identity(), index)).await??;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}
