//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the suite runner,
//! including command execution and file system helpers.
//!
//! 此模块为套件运行器提供基础设施服务，
//! 包括命令执行和文件系统工具。

pub mod command;
pub mod fs;
