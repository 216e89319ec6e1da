use bson::{doc, to_bson, Document};

use abi::errors::Error;
use abi::model::User;

/// users are written by hand because the model never serializes the password
pub(crate) fn user_to_doc(user: &User) -> Result<Document, Error> {
    let document = doc! {
        "_id": &user.id,
        "full_name": &user.full_name,
        "email": &user.email,
        "password": &user.password,
        "avatar": to_bson(&user.avatar)?,
        "bio": to_bson(&user.bio)?,
        "onboarded": user.onboarded,
        "role": to_bson(&user.role)?,
        "is_active": user.is_active,
        "approval_status": to_bson(&user.approval_status)?,
        "friends": to_bson(&user.friends)?,
        "create_time": user.create_time,
        "update_time": user.update_time,
    };

    Ok(document)
}

/// true when the write failed on a unique index
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        _ => false,
    }
}
