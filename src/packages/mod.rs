//! Bundled extension packages.

pub mod howto;
pub mod return_types;
pub mod samples;

pub use howto::HowToComponents;
pub use return_types::ReturnTypes;
pub use samples::Samples;

use crate::binder::error::Result;
use crate::extension::resolver::ScriptContext;

/// Register every bundled script package.
pub fn register_script_packages(scripts: &mut ScriptContext) -> Result<()> {
    scripts.add_package::<HowToComponents>()?;
    scripts.add_package::<ReturnTypes>()?;
    Ok(())
}
