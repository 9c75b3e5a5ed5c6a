pub const APP_USAGE: &str = "\
rpdemo-app — OIDC authorization-code login demo

USAGE:
    rpdemo-app [OPTIONS]

OPTIONS:
    -h, --help           Print this help message and exit
    -v, --version        Print version and exit

ROUTES:
    GET /                Login page
    GET /auth            Redirect to the identity provider
    GET /callback        Exchange the code and print ID-token claims as JSON

ENVIRONMENT:
    ISSUER               Identity provider issuer URL (required)
    CLIENT_ID            OIDC client id (see rpdemo-oidcrp)
    CLIENT_SECRET        OIDC client secret (see rpdemo-oidcrp)
    PORT                 Listen port                       [8080]
    PUBLIC_BASE_URL      Externally visible base URL       [http://localhost:$PORT]
    SCOPES               Requested scopes                  [openid]
    RUST_LOG             Log filter                        [info]
";

pub const OIDCRP_USAGE: &str = "\
rpdemo-oidcrp — create an OIDC web application through the ZITADEL management API

USAGE:
    rpdemo-oidcrp [OPTIONS]

OPTIONS:
    -h, --help           Print this help message and exit
    -v, --version        Print version and exit

ENVIRONMENT:
    ZITADEL_URL          Management API base URL           [http://localhost:8080]
    ZITADEL_KEY_FILE     Service-account key file          [./machinekey/zitadel-admin-sa.json]
    RP_REDIRECT_URI      Redirect URI of the new app       [http://localhost:7070/callback]
    RUST_LOG             Log filter                        [info]
";

pub const USER_USAGE: &str = "\
rpdemo-user — create a human test user through the ZITADEL management API

USAGE:
    rpdemo-user [OPTIONS]

OPTIONS:
    -h, --help           Print this help message and exit
    -v, --version        Print version and exit

ENVIRONMENT:
    ZITADEL_URL          Management API base URL           [http://localhost:8080]
    ZITADEL_KEY_FILE     Service-account key file          [./machinekey/zitadel-admin-sa.json]
    RUST_LOG             Log filter                        [info]
";

/// Name, help text and version of one binary.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub name: &'static str,
    pub text: &'static str,
    pub version: &'static str,
}

impl Usage {
    pub fn print_usage(&self) {
        print!("{}", self.text);
    }

    pub fn print_version(&self) {
        println!("{} {}", self.name, self.version);
    }
}

fn handle_cli_flags_from_args(args: &[String], usage: &Usage) -> bool {
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                usage.print_usage();
                return true;
            }
            "-v" | "--version" => {
                usage.print_version();
                return true;
            }
            _ => {}
        }
    }
    false
}

/// Check CLI args for --help/-h or --version/-v.
/// Returns `true` if a flag was handled (caller should exit).
pub fn handle_cli_flags(usage: &Usage) -> bool {
    let args: Vec<String> = std::env::args().skip(1).collect();
    handle_cli_flags_from_args(&args, usage)
}
