use std::io::Write;

pub fn read_input(name: &str) -> String {
    eprint!("Please enter {name}: ");
    let _ = std::io::stderr().flush();
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim_end_matches(['\r', '\n']).to_string()
}

pub fn read_input_hidden(name: &str) -> String {
    rpassword::prompt_password(format!("Please enter {name}: ")).unwrap_or_default()
}
