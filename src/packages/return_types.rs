//! One script function per supported return type.

use chrono::Local;

use crate::binder::error::Result;
use crate::binder::value::{types, Value};
use crate::extension::types::{Arguments, ExtensionPackage, MethodDef};

#[derive(Debug, Default)]
pub struct ReturnTypes;

impl ReturnTypes {
    fn return_void(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(None)
    }

    fn return_null(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(None)
    }

    fn return_boolean(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Boolean(true)))
    }

    fn return_integer(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Integer(20)))
    }

    fn return_long(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Long(20)))
    }

    fn return_float(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Float(0.1)))
    }

    fn return_double(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Double(0.1)))
    }

    fn return_date(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
        Ok(Some(Value::Date(Local::now().naive_local())))
    }
}

impl ExtensionPackage for ReturnTypes {
    fn package_name() -> &'static str {
        "ReturnTypes"
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("returnVoid", ReturnTypes::return_void).function(),
            MethodDef::new("returnNull", ReturnTypes::return_null)
                .returns(types::STRING)
                .function(),
            MethodDef::new("returnBooleanPrimitive", ReturnTypes::return_boolean)
                .returns(types::BOOL)
                .function(),
            MethodDef::new("returnBoolean", ReturnTypes::return_boolean)
                .returns(types::OPT_BOOL)
                .function(),
            MethodDef::new("returnIntegerPrimitive", ReturnTypes::return_integer)
                .returns(types::I32)
                .function(),
            MethodDef::new("returnInteger", ReturnTypes::return_integer)
                .returns(types::OPT_I32)
                .function(),
            MethodDef::new("returnLongPrimitive", ReturnTypes::return_long)
                .returns(types::I64)
                .function(),
            MethodDef::new("returnLong", ReturnTypes::return_long)
                .returns(types::OPT_I64)
                .function(),
            MethodDef::new("returnFloatPrimitive", ReturnTypes::return_float)
                .returns(types::F32)
                .function(),
            MethodDef::new("returnFloat", ReturnTypes::return_float)
                .returns(types::OPT_F32)
                .function(),
            MethodDef::new("returnDoublePrimitive", ReturnTypes::return_double)
                .returns(types::F64)
                .function(),
            MethodDef::new("returnDouble", ReturnTypes::return_double)
                .returns(types::OPT_F64)
                .function(),
            MethodDef::new("returnDate", ReturnTypes::return_date)
                .returns(types::DATE)
                .function(),
        ]
    }
}
