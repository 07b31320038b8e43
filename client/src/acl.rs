//! Access-control types shared by the bucket and object APIs.
use crate::options::{HeaderOptions, OptionField};
use serde::{Deserialize, Serialize};

/// Storage class of an object: `STANDARD`
pub const STORAGE_CLASS_STANDARD: &str = "STANDARD";
/// Storage class of an object: `STANDARD_IA`
pub const STORAGE_CLASS_STANDARD_IA: &str = "STANDARD_IA";
/// Storage class of an object: `ARCHIVE`
pub const STORAGE_CLASS_ARCHIVE: &str = "ARCHIVE";

pub const OBJECT_TYPE_NORMAL: &str = "normal";
pub const OBJECT_TYPE_APPENDABLE: &str = "appendable";

/// Server-side encryption algorithm: `AES256`
pub const SERVER_SIDE_ENCRYPTION_AES256: &str = "AES256";

pub const PERMISSION_READ: &str = "READ";
pub const PERMISSION_WRITE: &str = "WRITE";
pub const PERMISSION_FULL_CONTROL: &str = "FULL_CONTROL";

/// The owner of a bucket or object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "uin", default, skip_serializing_if = "Option::is_none")]
    pub uin: Option<String>,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "DisplayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Owner {
    /// An owner identified only by account UIN.
    pub fn with_uin<S: Into<String>>(uin: S) -> Self {
        Self {
            uin: Some(uin.into()),
            ..Self::default()
        }
    }
}

/// The account a grant applies to.  `grantee_type` is carried as the `type` attribute, e.g.
/// `RootAccount` or `SubAccount`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGrantee {
    #[serde(rename = "@type", default)]
    pub grantee_type: String,
    #[serde(rename = "uin", default, skip_serializing_if = "Option::is_none")]
    pub uin: Option<String>,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "DisplayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "Subaccount", default, skip_serializing_if = "Option::is_none")]
    pub sub_account: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGrant {
    #[serde(rename = "Grantee")]
    pub grantee: AclGrantee,
    /// One of [`PERMISSION_READ`], [`PERMISSION_WRITE`] or [`PERMISSION_FULL_CONTROL`]
    #[serde(rename = "Permission")]
    pub permission: String,
}

impl AclGrant {
    /// Grant `permission` to the root account `uin`.
    pub fn root_account<U: Into<String>, P: Into<String>>(uin: U, permission: P) -> Self {
        Self {
            grantee: AclGrantee {
                grantee_type: "RootAccount".to_owned(),
                uin: Some(uin.into()),
                ..AclGrantee::default()
            },
            permission: permission.into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlList {
    #[serde(rename = "Grant", default)]
    pub grants: Vec<AclGrant>,
}

impl AccessControlList {
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// An access-control policy document.  It is always sent with the root element
/// `AccessControlPolicy`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "AccessControlPolicy")]
pub struct AclXml {
    #[serde(rename = "Owner", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(
        rename = "AccessControlList",
        default,
        skip_serializing_if = "AccessControlList::is_empty"
    )]
    pub access_control_list: AccessControlList,
}

/// ACL settings carried in request headers, as an alternative to an [`AclXml`] body.
///
/// Grant values have the form `id="[OwnerUin]"`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AclHeaderOptions {
    /// `private`, `public-read` or `public-read-write`
    pub x_cos_acl: String,
    pub x_cos_grant_read: String,
    pub x_cos_grant_write: String,
    pub x_cos_grant_full_control: String,
}

impl AclHeaderOptions {
    pub(crate) fn fields(&self) -> [OptionField; 4] {
        [
            OptionField::omit_empty("x-cos-acl", &self.x_cos_acl),
            OptionField::omit_empty("x-cos-grant-read", &self.x_cos_grant_read),
            OptionField::omit_empty("x-cos-grant-write", &self.x_cos_grant_write),
            OptionField::omit_empty("x-cos-grant-full-control", &self.x_cos_grant_full_control),
        ]
    }
}

impl HeaderOptions for AclHeaderOptions {
    fn header_fields(&self) -> Vec<OptionField> {
        self.fields().into()
    }
}
