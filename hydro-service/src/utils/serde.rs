pub mod serde_status_code {
    use axum::http::StatusCode;
    use serde::Serializer;

    pub fn serialize<S>(value: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(value.as_u16())
    }
}

pub mod serde_uri {
    use axum::http::Uri;
    use serde::Serializer;

    pub fn serialize_opt<S>(value: &Option<Uri>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(value) = value {
            serializer.collect_str(value)
        } else {
            serializer.serialize_none()
        }
    }
}
