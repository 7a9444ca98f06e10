use anyhow::Result;

use chroma_engine::device::GpuInit;
use chroma_engine::logging::{init_logging, LoggingConfig};
use chroma_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let gpu_init = GpuInit::default().with_env_overrides();
    log::debug!("requesting backends {:?}", gpu_init.backends);

    Runtime::run(RuntimeConfig::default(), gpu_init)
}
