//! The classic "HowTo" script extensions.
//!
//! Provides the `factorial`, `log`, `renamedFunc` and `strMin` functions and
//! the `never`, `TodaysDateIsEven` and `UppercaseUserName` variables.

use chrono::{Datelike, Local};
use tracing::info;

use crate::binder::error::{BindError, Result};
use crate::binder::value::{types, Value};
use crate::extension::types::{Arguments, ExtensionPackage, MethodDef};
use crate::parameter::ParamSpec;

/// Key that makes `log` dump the store instead of evaluating script.
pub const LOCAL_DATA_KEY: &str = "#LocalData";

#[derive(Debug, Default)]
pub struct HowToComponents;

impl HowToComponents {
    /// UppercaseUserName - the current user's full name in upper case.
    fn uppercase_user_name(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let ctx = args.get_context(0)?;
        let user = ctx
            .user_data()
            .ok_or_else(|| BindError::MissingContext("UserData".to_string()))?;
        let full_name = user.get_property("dFullName").unwrap_or_default();
        Ok(Some(Value::String(full_name.to_uppercase())))
    }

    /// TodaysDateIsEven - whether the local day of month is even.
    fn todays_date_is_even(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Boolean(Local::now().day() % 2 == 0)))
    }

    fn never(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Boolean(false)))
    }

    /// factorial(n)
    fn factorial(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let input = args.get_i64(0)?;
        if input < 0 {
            return Err(BindError::method_failed(
                "factorial",
                format!("Cannot perform a factorial function on the negative number '{}'", input),
            ));
        }

        let mut result: i64 = 1;
        for i in 1..=input {
            result = result.checked_mul(i).ok_or_else(|| {
                BindError::method_failed("factorial", format!("factorial of {} overflows", input))
            })?;
        }
        Ok(Some(Value::Long(result)))
    }

    /// log(message) - write evaluated script, or the whole store for
    /// `#LocalData`, to the trace output.
    fn log(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let message = args.get_str(0)?;

        if message.eq_ignore_ascii_case(LOCAL_DATA_KEY) {
            let binder = args.get_binder(1)?;
            info!(target: "twine", "LocalData:");
            for name in binder.local_names() {
                match binder.get_local(&name) {
                    Some(value) if !value.is_empty() => {
                        info!(target: "twine", "  {}={}", name, value)
                    }
                    _ => {}
                }
            }
        } else {
            match args.get_page_merger(2) {
                Ok(merger) => info!(target: "twine", "{}", merger.evaluate_script(message)?),
                Err(_) => info!(target: "twine", "{}", message),
            }
        }
        Ok(None)
    }

    /// renamedFunc(text) - the number of characters in `text`.
    fn string_length(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let text = args.get_opt_str(0)?.unwrap_or_default();
        Ok(Some(Value::Integer(text.chars().count() as i32)))
    }

    /// strMin(a, b) - whichever of the two sorts first, ignoring case.
    fn str_min(&mut self, args: &mut Arguments) -> Result<Option<Value>> {
        let a = args.get_opt_str(0)?.unwrap_or_default();
        let b = args.get_opt_str(1)?.unwrap_or_default();
        let min = if a.to_lowercase() <= b.to_lowercase() { a } else { b };
        Ok(Some(Value::from(min)))
    }
}

impl ExtensionPackage for HowToComponents {
    fn package_name() -> &'static str {
        "HowToComponents"
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("uppercaseUserName", HowToComponents::uppercase_user_name)
                .param(ParamSpec::unnamed(types::EXECUTION_CONTEXT))
                .returns(types::STRING)
                .variable_named("UppercaseUserName"),
            MethodDef::new("todaysDateIsEven", HowToComponents::todays_date_is_even)
                .returns(types::BOOL)
                .variable_named("TodaysDateIsEven"),
            MethodDef::new("never", HowToComponents::never)
                .returns(types::BOOL)
                .variable(),
            MethodDef::new("factorial", HowToComponents::factorial)
                .param(ParamSpec::unnamed(types::I64))
                .returns(types::I64)
                .function(),
            MethodDef::new("log", HowToComponents::log)
                .param(ParamSpec::unnamed(types::STRING))
                .param(ParamSpec::unnamed(types::BINDER))
                .param(ParamSpec::unnamed(types::PAGE_MERGER))
                .function(),
            MethodDef::new("stringLength", HowToComponents::string_length)
                .param(ParamSpec::unnamed(types::STRING))
                .returns(types::I32)
                .function_named("renamedFunc"),
            MethodDef::new("strMin", HowToComponents::str_min)
                .param(ParamSpec::unnamed(types::STRING))
                .param(ParamSpec::unnamed(types::STRING))
                .returns(types::STRING)
                .function(),
        ]
    }
}
