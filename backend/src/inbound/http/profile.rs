//! Customer profile and address book handlers.
//!
//! ```text
//! GET    /api/v1/user/profile
//! PATCH  /api/v1/user/profile
//! GET    /api/v1/user/profile/addresses
//! POST   /api/v1/user/profile/addresses
//! GET    /api/v1/user/profile/addresses/{id}
//! PUT    /api/v1/user/profile/addresses/{id}
//! PATCH  /api/v1/user/profile/addresses/{id}/default
//! DELETE /api/v1/user/profile/addresses/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::address::{Address, AddressInput};
use crate::domain::user::UserProfile;
use crate::domain::{AddressId, Error, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileBody {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`, in the past.
    #[schema(example = "1994-03-17")]
    pub dob: String,
    pub mobile: String,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    /// http or https image URL.
    pub photo: Option<String>,
}

impl From<ProfileBody> for ProfileUpdate {
    fn from(body: ProfileBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            dob: body.dob,
            mobile: body.mobile,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
            photo: body.photo,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressBody {
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: String,
    pub city: String,
    #[schema(example = "682001")]
    pub pincode: String,
    pub landmark: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    /// Make this the default address. Ignored on update.
    pub is_default: bool,
}

impl AddressBody {
    fn into_parts(self) -> (AddressInput, bool) {
        let input = AddressInput {
            first_name: self.first_name,
            last_name: self.last_name,
            state: self.state,
            district: self.district,
            city: self.city,
            pincode: self.pincode,
            landmark: self.landmark,
            mobile: self.mobile,
            alternate_mobile: self.alternate_mobile,
        };
        (input, self.is_default)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> web::Json<UserProfile> {
    web::Json(UserProfile::from(&user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/profile",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Mobile number already in use", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[patch("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<ProfileBody>,
) -> ApiResult<web::Json<UserProfile>> {
    let profile = state
        .accounts
        .update_profile(user, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

/// Default address first, then newest.
#[utoipa::path(
    get,
    path = "/api/v1/user/profile/addresses",
    responses(
        (status = 200, description = "Saved addresses", body = [Address]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listAddresses"
)]
#[get("/profile/addresses")]
pub async fn list_addresses(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<Vec<Address>>> {
    Ok(web::Json(state.accounts.addresses(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/profile/addresses/{id}",
    params(("id" = AddressId, Path, description = "Address id")),
    responses(
        (status = 200, description = "Address", body = Address),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getAddress"
)]
#[get("/profile/addresses/{id}")]
pub async fn get_address(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<AddressId>,
) -> ApiResult<web::Json<Address>> {
    Ok(web::Json(state.accounts.address(user.id, id.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/profile/addresses",
    request_body = AddressBody,
    responses(
        (status = 201, description = "Address saved", body = Address),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["profile"],
    operation_id = "createAddress"
)]
#[post("/profile/addresses")]
pub async fn create_address(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<AddressBody>,
) -> ApiResult<HttpResponse> {
    let (input, make_default) = payload.into_inner().into_parts();
    let address = state
        .accounts
        .create_address(user.id, input, make_default)
        .await?;
    Ok(HttpResponse::Created().json(address))
}

#[utoipa::path(
    put,
    path = "/api/v1/user/profile/addresses/{id}",
    params(("id" = AddressId, Path, description = "Address id")),
    request_body = AddressBody,
    responses(
        (status = 200, description = "Address replaced", body = Address),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateAddress"
)]
#[put("/profile/addresses/{id}")]
pub async fn update_address(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<AddressId>,
    payload: web::Json<AddressBody>,
) -> ApiResult<web::Json<Address>> {
    let (input, _) = payload.into_inner().into_parts();
    let address = state
        .accounts
        .update_address(user.id, id.into_inner(), input)
        .await?;
    Ok(web::Json(address))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/profile/addresses/{id}/default",
    params(("id" = AddressId, Path, description = "Address id")),
    responses(
        (status = 200, description = "Now the default address", body = Address),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profile"],
    operation_id = "makeDefaultAddress"
)]
#[patch("/profile/addresses/{id}/default")]
pub async fn make_default_address(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<AddressId>,
) -> ApiResult<web::Json<Address>> {
    let address = state
        .accounts
        .make_default_address(user.id, id.into_inner())
        .await?;
    Ok(web::Json(address))
}

/// Deleting the default promotes the oldest remaining address.
#[utoipa::path(
    delete,
    path = "/api/v1/user/profile/addresses/{id}",
    params(("id" = AddressId, Path, description = "Address id")),
    responses(
        (status = 200, description = "Address deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profile"],
    operation_id = "deleteAddress"
)]
#[delete("/profile/addresses/{id}")]
pub async fn delete_address(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<AddressId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.accounts.delete_address(user.id, id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("address deleted")))
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
