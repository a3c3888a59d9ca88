pub mod data;
pub mod export;
pub mod worker;

pub fn print_banner() {
    println!(
        r#"
                         _
  __ _ _ __ __ _ _ __ | |__  ___  ___ __ _ _ __   ___
 / _` | '__/ _` | '_ \| '_ \/ __|/ __/ _` | '_ \ / _ \
| (_| | | | (_| | |_) | | | \__ \ (_| (_| | |_) |  __/
 \__, |_|  \__,_| .__/|_| |_|___/\___\__,_| .__/ \___|
 |___/          |_|                       |_|

 3-D spatial layouts for relational data  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
