/// Built-in DNS providers
#[cfg(feature = "dns-alibaba")]
pub mod alibaba;
#[cfg(feature = "dns-azure")]
pub mod azure;
#[cfg(feature = "dns-cloudflare")]
pub mod cloudflare;
#[cfg(feature = "dns-cloudns")]
pub mod cloudns;
#[cfg(feature = "dns-digitalocean")]
pub mod digitalocean;
#[cfg(feature = "dns-godaddy")]
pub mod godaddy;
#[cfg(feature = "dns-google")]
pub mod google;
#[cfg(feature = "dns-huawei")]
pub mod huawei;
#[cfg(feature = "dns-linode")]
pub mod linode;
#[cfg(feature = "dns-route53")]
pub mod route53;
#[cfg(feature = "dns-tencent")]
pub mod tencent;

#[cfg(feature = "dns-alibaba")]
pub use alibaba::AlibabaCloudDnsProvider;
#[cfg(feature = "dns-azure")]
pub use azure::AzureDnsProvider;
#[cfg(feature = "dns-cloudflare")]
pub use cloudflare::CloudFlareDnsProvider;
#[cfg(feature = "dns-cloudns")]
pub use cloudns::ClouDnsProvider;
#[cfg(feature = "dns-digitalocean")]
pub use digitalocean::DigitalOceanDnsProvider;
#[cfg(feature = "dns-godaddy")]
pub use godaddy::GodaddyDnsProvider;
#[cfg(feature = "dns-google")]
pub use google::GoogleCloudDnsProvider;
#[cfg(feature = "dns-huawei")]
pub use huawei::HuaweiCloudDnsProvider;
#[cfg(feature = "dns-linode")]
pub use linode::LinodeDnsProvider;
#[cfg(feature = "dns-route53")]
pub use route53::Route53DnsProvider;
#[cfg(feature = "dns-tencent")]
pub use tencent::TencentCloudDnsProvider;
