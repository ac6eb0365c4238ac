pub mod deploy;
pub mod init;
pub mod install;
pub mod make;
pub mod release;
pub mod undeploy;
