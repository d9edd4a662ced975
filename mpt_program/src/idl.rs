use mpt_idl::{
    IdlAccount, IdlAccountItem, IdlDefinition, IdlError, IdlField, IdlInstruction, IdlMetadata,
    IdlSeed, IdlTypeDef, Version,
};

use crate::{
    client::SYSTEM_PROGRAM_ADDRESS,
    error::MptError,
    instructions::MptInstruction,
    state::{PROOF_DISCRIMINANT, PROOF_SEED},
    ID_ADDRESS, PROGRAM_NAME,
};

fn proof_account(writable: bool) -> IdlAccountItem {
    IdlAccountItem::new("proof", writable, false).with_seeds(vec![
        IdlSeed::Const(PROOF_SEED.to_vec()),
        IdlSeed::Arg("root".into()),
    ])
}

fn bytes() -> IdlTypeDef {
    IdlTypeDef::Bytes
}

/// The interface description of the compiled program.
#[must_use]
pub fn program_idl() -> IdlDefinition {
    let instructions = vec![
        IdlInstruction {
            name: "init_proof".into(),
            discriminant: vec![MptInstruction::INIT_PROOF],
            docs: vec!["Creates the proof account for a trie root.".into()],
            accounts: vec![
                IdlAccountItem::new("payer", true, true),
                proof_account(true),
                IdlAccountItem::new("system_program", false, false)
                    .with_address(SYSTEM_PROGRAM_ADDRESS),
            ],
            args: vec![
                IdlField::new("root", IdlTypeDef::array(IdlTypeDef::U8, 32)),
                IdlField::new("proof_size", IdlTypeDef::U32),
                IdlField::new("bump", IdlTypeDef::U8),
            ],
        },
        IdlInstruction {
            name: "append_proof".into(),
            discriminant: vec![MptInstruction::APPEND_PROOF],
            docs: vec![
                "Appends proof nodes. With `is_merge` the first node extends the last stored one."
                    .into(),
            ],
            accounts: vec![
                IdlAccountItem::new("authority", false, true),
                IdlAccountItem::new("proof", true, false),
            ],
            args: vec![
                IdlField::new("nodes", IdlTypeDef::vec(bytes())),
                IdlField::new("is_merge", IdlTypeDef::Bool),
            ],
        },
        IdlInstruction {
            name: "view_proof".into(),
            discriminant: vec![MptInstruction::VIEW_PROOF],
            docs: vec!["Returns the proof account header.".into()],
            accounts: vec![IdlAccountItem::new("proof", false, false)],
            args: vec![],
        },
        IdlInstruction {
            name: "validate_mpt".into(),
            discriminant: vec![MptInstruction::VALIDATE_MPT],
            docs: vec!["Verifies the uploaded proof for `key` and returns the value.".into()],
            accounts: vec![IdlAccountItem::new("proof", true, false)],
            args: vec![IdlField::new("key", bytes())],
        },
    ];

    let u8_array = |len| IdlTypeDef::array(IdlTypeDef::U8, len);
    let accounts = vec![IdlAccount {
        name: "ProofAccount".into(),
        discriminant: PROOF_DISCRIMINANT.to_vec(),
        docs: vec!["Header of an uploaded proof, followed by the node list.".into()],
        fields: vec![
            IdlField::new("root", u8_array(32)),
            IdlField::new("authority", IdlTypeDef::Address),
            IdlField::new("proof_size", IdlTypeDef::U32),
            IdlField::new("written", IdlTypeDef::U32),
            IdlField::new("node_count", IdlTypeDef::U32),
            IdlField::new("last_node_offset", IdlTypeDef::U32),
            IdlField::new("bump", IdlTypeDef::U8),
            IdlField::new("status", IdlTypeDef::U8),
            IdlField::new("padding", u8_array(6)),
        ],
    }];

    let errors = MptError::ALL
        .into_iter()
        .map(|error| IdlError {
            code: error.code(),
            name: error.name().into(),
            msg: error.msg().into(),
        })
        .collect();

    IdlDefinition {
        address: ID_ADDRESS,
        metadata: IdlMetadata {
            name: PROGRAM_NAME.into(),
            version: Version::parse(env!("CARGO_PKG_VERSION"))
                .unwrap_or_else(|_| Version::new(0, 0, 0)),
            docs: vec!["Ethereum Merkle-Patricia trie proof verifier.".into()],
            repository: Some(env!("CARGO_PKG_REPOSITORY").into()),
            ..Default::default()
        },
        instructions,
        accounts,
        errors,
    }
}
