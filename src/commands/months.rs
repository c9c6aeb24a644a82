use crate::api::{self, Ledger};
use crate::args::MonthsArgs;
use crate::commands::{fetch, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::MonthKey;
use crate::tree::build;
use crate::{Config, Result};

/// Lists the months, as `YYYY-MM`, in which the project has dated ledger lines. These are the
/// values accepted by `--month`.
pub async fn months(config: Config, args: MonthsArgs) -> Result<Out<Vec<MonthKey>>> {
    let mut ledger = api::ledger(&config, args.file()).pub_result(ErrorType::Config)?;
    months_with(ledger.as_mut(), args.project()).await
}

async fn months_with(
    ledger: &mut (dyn Ledger + Send),
    project: &str,
) -> Result<Out<Vec<MonthKey>>> {
    let data = fetch(ledger, project).await?;
    let months: Vec<MonthKey> = build(&data).available_months().into_iter().collect();
    if months.is_empty() {
        return Ok(Out::new(
            format!("Project {project} has no dated records"),
            months,
        ));
    }
    let list = months
        .iter()
        .map(MonthKey::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Out::new(list, months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryLedger;
    use crate::model::LedgerData;
    use crate::test::seed_data;

    #[tokio::test]
    async fn test_months() {
        let mut ledger = MemoryLedger::new().with_project("PRJ-001", seed_data());
        let out = months_with(&mut ledger, "PRJ-001").await.unwrap();
        assert_eq!(out.message(), "2024-02, 2024-03, 2024-04");
        assert_eq!(out.structure().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_months() {
        let mut ledger = MemoryLedger::new().with_project("EMPTY", LedgerData::default());
        let out = months_with(&mut ledger, "EMPTY").await.unwrap();
        assert!(out.message().contains("no dated records"));
    }
}
