use myshell::Interpreter;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let code = match Interpreter::default().repl() {
        Ok(code) => code,
        Err(err) => {
            log::error!("shell terminated: {err:#}");
            1
        }
    };
    std::process::exit(code)
}
