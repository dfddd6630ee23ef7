// openstax-deploy - CloudFormation deployments for OpenStax web properties
//
// Two deployments live here:
// - customized_pages: pages bucket, CDN and DNS, plus a deny-all robots.txt
// - hosted_edited: DNS for the hosted edited site
//
// Both run against the sandbox account unless --production_aws is given,
// and only make changes when --do_it is given.

pub mod cli;
pub mod deploy;
mod init;

pub use cli::{standard_args, StandardFlag, StandardFlags};
pub use deploy::{Action, CustomizedPages, Deployment, DeploymentOptions, HostedEdited};
pub use init::{configure_openstax_aws, init_openstax_aws};
