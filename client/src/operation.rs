use std::fmt;

/// Identifies the API operation a request belongs to.  It is passed to the [`Sender`] and
/// [`ResponseParser`] along with each request.
///
/// [`Sender`]: crate::Sender
/// [`ResponseParser`]: crate::ResponseParser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ServiceGet,
    BucketGetAcl,
    BucketPutAcl,
    BucketGetLocation,
    BucketGetLifecycle,
    BucketPutLifecycle,
    BucketDeleteLifecycle,
    ObjectPut,
    ObjectGet,
    ObjectHead,
    ObjectDelete,
    /// An operation issued directly through [`Client::send`](crate::Client::send)
    Custom(&'static str),
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ServiceGet => "Service.Get",
            Operation::BucketGetAcl => "Bucket.GetACL",
            Operation::BucketPutAcl => "Bucket.PutACL",
            Operation::BucketGetLocation => "Bucket.GetLocation",
            Operation::BucketGetLifecycle => "Bucket.GetLifecycle",
            Operation::BucketPutLifecycle => "Bucket.PutLifecycle",
            Operation::BucketDeleteLifecycle => "Bucket.DeleteLifecycle",
            Operation::ObjectPut => "Object.Put",
            Operation::ObjectGet => "Object.Get",
            Operation::ObjectHead => "Object.Head",
            Operation::ObjectDelete => "Object.Delete",
            Operation::Custom(name) => name,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
