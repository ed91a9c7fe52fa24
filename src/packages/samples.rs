//! A hello world filter and a small service.

use tracing::info;

use crate::binder::error::{BindError, Result};
use crate::binder::value::{types, Value};
use crate::extension::filter_proxy::FilterStatus;
use crate::extension::types::{Arguments, ExtensionPackage, MethodDef, ServiceTag};
use crate::parameter::ParamSpec;

/// Store key that makes `guardWorkspace` abort the event.
pub const ABORT_KEY: &str = "abortFilters";

/// Upper bound on the `count` an echo request may ask for.
pub const MAX_ECHO_COUNT: i32 = 100;

#[derive(Debug, Default)]
pub struct Samples;

impl Samples {
    fn hello_world(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        info!(target: "twine", "ExampleFilter: Hello World!");
        Ok(Some(Value::Integer(FilterStatus::Continue.code())))
    }

    /// Aborts when the store asks for it, finishes when no workspace is set.
    fn guard_workspace(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let binder = args.get_binder(1)?;
        if binder.get_local(ABORT_KEY).as_deref() == Some("1") {
            return Ok(Some(Value::Long(i64::from(FilterStatus::Abort.code()))));
        }
        let status = match args.get_workspace(0) {
            Ok(_) => FilterStatus::Continue,
            Err(_) => FilterStatus::Finished,
        };
        Ok(Some(Value::Long(i64::from(status.code()))))
    }

    /// TWINE_ECHO - repeats `code` `count` times, upper-cased when the
    /// request asks for it.
    fn echo(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let code = args.get_str(0)?;
        let count = args.get_opt_i32(1)?.unwrap_or(1);
        if count > MAX_ECHO_COUNT {
            return Err(BindError::method_failed(
                "echo",
                format!("count {} exceeds {}", count, MAX_ECHO_COUNT),
            ));
        }
        let count = count.max(0) as usize;
        let shout = args.get_opt_bool(2)?.unwrap_or(false);

        let mut echoed = vec![code; count].join(" ");
        if shout {
            echoed = echoed.to_uppercase();
        }
        if let Ok(user) = args.get_user_data(3) {
            info!(target: "twine", "TWINE_ECHO for {}", user.name());
        }
        Ok(Some(Value::String(echoed)))
    }
}

impl ExtensionPackage for Samples {
    fn package_name() -> &'static str {
        "Samples"
    }

    fn methods() -> Vec<MethodDef<Self>> {
        let mut echo = ServiceTag::new("TWINE_ECHO");
        echo.template = "TWINE_ECHO_RESULT";
        echo.subjects = "echo";

        vec![
            MethodDef::new("helloWorld", Samples::hello_world)
                .returns(types::I32)
                .filter("extraAfterProvidersStartedInit", None),
            MethodDef::new("guardWorkspace", Samples::guard_workspace)
                .param(ParamSpec::unnamed(types::WORKSPACE))
                .param(ParamSpec::unnamed(types::BINDER))
                .returns(types::I64)
                .filter("validateStandard", Some(10)),
            MethodDef::new("echo", Samples::echo)
                .param(ParamSpec::required("code", types::STRING))
                .param(ParamSpec::optional("count", types::OPT_I32))
                .param(ParamSpec::optional("shout", types::OPT_BOOL))
                .param(ParamSpec::unnamed(types::USER_DATA))
                .returns(types::STRING)
                .service(echo),
        ]
    }
}
