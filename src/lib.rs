//! Photo Lingo CLI Library
//!
//! 写真をAIで解析し、英語学習用の説明文・単語・発音を生成するツール。
//! 解析コアは photo-lingo-common にあり、このクレートは
//! CLI向けの取り込み・読み上げ・デッキ・クイズを担当する。

pub mod ai_provider;
pub mod analyzer;
pub mod capture;
pub mod cli;
pub mod config;
pub mod deck;
pub mod error;
pub mod quiz;
pub mod scanner;
pub mod speech;
