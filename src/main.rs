use log::debug;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        eprintln!("cshell: 无法初始化日志: {}", e);
    }
    debug!("配置加载成功 {:?}", config);

    let mut shell = Shell::new(&config)?;
    shell.run()
}
