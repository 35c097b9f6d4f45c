use crate::domain::model::{Coordinates, VisitRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// 檔案不存在時回傳 `Ok(None)`
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn stops_file(&self) -> &str;
    fn directions_base_url(&self) -> &str;
    fn maps_api_key(&self) -> Option<&str>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> Result<Option<String>>;
}

#[async_trait]
pub trait VisitLog: Send + Sync {
    async fn append(&self, record: &VisitRecord) -> Result<()>;
}
