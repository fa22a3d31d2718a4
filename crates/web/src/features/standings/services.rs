use storage::dto::groups::{GroupTableResponse, QualificationResponse};
use tournament::{PoolService, Result, Scope};

pub async fn list_group_tables(pool: &PoolService, scope: &Scope) -> Result<Vec<GroupTableResponse>> {
    let tables = pool.group_tables(scope).await?;
    Ok(tables.iter().map(GroupTableResponse::from).collect())
}

pub async fn get_qualification(pool: &PoolService, scope: &Scope) -> Result<QualificationResponse> {
    let qualification = pool.qualification(scope).await?;
    Ok(QualificationResponse::from(&qualification))
}
