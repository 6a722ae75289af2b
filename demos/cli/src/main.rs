use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use claims_core::{parse_type_list, ClaimType, TransformConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "claims-cli",
    about = "Chuyển bundle Blue Button 2.0 FHIR JSON thành bản ghi claim phẳng."
)]
struct Cli {
    /// Đường dẫn tới file JSON bundle.
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// In JSON có thụt lề.
    #[arg(long, global = true)]
    pretty: bool,

    /// Mức log khi RUST_LOG không được đặt.
    #[arg(long, global = true, env = "CLAIMS_LOG", default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Loại bảo hiểm gán cho claim.
    #[arg(long, global = true, env = "CLAIMS_INSURANCE_TYPE")]
    insurance_type: Option<String>,

    /// Tên đơn vị chi trả.
    #[arg(long, global = true, env = "CLAIMS_PAYER_NAME")]
    payer_name: Option<String>,
}

impl From<&ConfigArgs> for TransformConfig {
    fn from(args: &ConfigArgs) -> Self {
        let mut base = TransformConfig::default();
        if let Some(insurance_type) = &args.insurance_type {
            base.insurance_type = insurance_type.clone();
        }
        if let Some(payer_name) = &args.payer_name {
            base.payer_name = payer_name.clone();
        }
        base
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Claim đã kết nối (entry đầu tiên, hoặc tất cả với --all).
    Eob {
        /// Lọc theo loại claim trước, ví dụ CARRIER,SNF.
        #[arg(long = "type")]
        types: Option<String>,
        /// Chuyển mọi claim thay vì chỉ entry đầu tiên.
        #[arg(long)]
        all: bool,
    },
    /// Tóm tắt phẳng cho mọi claim.
    Claims {
        /// Lọc theo loại claim trước khi tóm tắt.
        #[arg(long = "type")]
        types: Option<String>,
    },
    /// Bundle chỉ giữ các loại claim đã chọn.
    Filter {
        /// Danh sách loại claim cần giữ, ví dụ CARRIER,SNF.
        #[arg(long = "type")]
        types: String,
    },
    /// Thông tin nhân khẩu học của mọi Patient.
    Patients,
    /// Coverage đã làm phẳng, kèm tóm tắt theo tháng.
    Coverage,
}

fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn claim_types(raw: Option<&str>) -> anyhow::Result<Option<Vec<ClaimType>>> {
    raw.map(|raw| parse_type_list(raw).with_context(|| format!("Danh sách loại claim sai: {raw}")))
        .transpose()
}

fn narrowed(bundle: Value, kinds: Option<Vec<ClaimType>>) -> Value {
    match kinds {
        Some(kinds) => claims_fhir::filter_by_claim_types(&bundle, &kinds),
        None => bundle,
    }
}

fn run(command: &Command, bundle: Value, config: &TransformConfig) -> anyhow::Result<Value> {
    let output = match command {
        Command::Eob { types, all } => {
            let bundle = narrowed(bundle, claim_types(types.as_deref())?);
            if *all {
                let claims = claims_fhir::transform_eob_bundle(&bundle, config)
                    .context("Không chuyển đổi được bundle")?;
                serde_json::to_value(claims)?
            } else {
                let claim = claims_fhir::transform_eob(&bundle, config)
                    .context("Không chuyển đổi được claim")?;
                serde_json::to_value(claim)?
            }
        }
        Command::Claims { types } => {
            let bundle = narrowed(bundle, claim_types(types.as_deref())?);
            serde_json::to_value(claims_fhir::summarize_claims(&bundle))?
        }
        Command::Filter { types } => {
            let kinds = parse_type_list(types)
                .with_context(|| format!("Danh sách loại claim sai: {types}"))?;
            claims_fhir::filter_by_claim_types(&bundle, &kinds)
        }
        Command::Patients => serde_json::to_value(claims_fhir::extract_patients(&bundle))?,
        Command::Coverage => serde_json::to_value(claims_fhir::extract_coverages(&bundle))?,
    };
    Ok(output)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let input = cli.input.as_ref().context("Thiếu --input")?;
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Không đọc được file {input:?}"))?;
    let bundle = claims_fhir::parse_json(&data)
        .with_context(|| format!("File {input:?} không phải JSON hợp lệ"))?;

    let config = TransformConfig::from(&cli.config);
    tracing::debug!(?config, command = ?cli.command, "running");

    let output = run(&cli.command, bundle, &config)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
