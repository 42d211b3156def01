//! Raw request passthrough: any path, any supported method.

use subservices_api::Params;

use crate::cli::RequestArgs;
use crate::error::CliError;

use super::Ctx;

pub async fn handle(ctx: &Ctx<'_>, args: RequestArgs) -> Result<(), CliError> {
    let params = build_params(args.params, args.data.as_deref())?;
    let method = args.method.to_ascii_uppercase();
    tracing::debug!(%method, path = %args.path, fields = params.len(), "raw request");

    ctx.emit(ctx.api.request(&args.path, params, &method).await)
}

/// `--param` pairs are sent as strings; `--data` keeps JSON scalar types.
fn build_params(pairs: Vec<(String, String)>, data: Option<&str>) -> Result<Params, CliError> {
    let Some(data) = data else {
        return Ok(pairs.into_iter().collect());
    };

    let value: serde_json::Value = serde_json::from_str(data)?;
    Params::try_from(value).map_err(|e| match e {
        subservices_api::Error::InvalidArgument(message) => CliError::Validation {
            field: "data".into(),
            reason: message,
        },
        other => CliError::Transport(other),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use subservices_api::ParamValue;

    use super::*;

    #[test]
    fn pairs_become_string_params() {
        let params = build_params(vec![("name".into(), "box1".into())], None).unwrap();
        assert_eq!(params.get("name"), Some(&ParamValue::from("box1")));
    }

    #[test]
    fn data_keeps_scalar_types() {
        let params = build_params(Vec::new(), Some(r#"{"location_id": 5, "name": "db"}"#)).unwrap();
        assert_eq!(params.get("location_id"), Some(&ParamValue::from(5_u64)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn data_must_be_an_object() {
        let err = build_params(Vec::new(), Some("[1, 2]")).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "data"));
    }

    #[test]
    fn malformed_data_is_a_json_error() {
        let err = build_params(Vec::new(), Some("{oops")).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }
}
