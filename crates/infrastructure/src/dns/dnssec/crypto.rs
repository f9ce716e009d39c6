use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{DnskeyRecord, DomainError, DsRecord, RrsigRecord, SignedRrset};
use ring::signature;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384};

/// Cryptographic signature verifier for DNSSEC
///
/// Provides methods to verify RRSIG signatures and DS hashes using various
/// cryptographic algorithms. Time validity is not checked here.
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Algorithms this verifier can check
    pub fn is_supported_algorithm(algorithm: u8) -> bool {
        matches!(algorithm, 5 | 7 | 8 | 10 | 13 | 14 | 15)
    }

    pub fn is_supported_digest(digest_type: u8) -> bool {
        DsRecord::digest_len(digest_type).is_some()
    }

    /// Verify an RRSIG over an RRset with one DNSKEY
    ///
    /// ## Returns
    ///
    /// `Ok(true)` if signature is valid, `Ok(false)` if invalid,
    /// `Err` if verification cannot be performed (malformed key or
    /// unsupported algorithm)
    pub fn verify_rrsig(
        &self,
        rrsig: &RrsigRecord,
        dnskey: &DnskeyRecord,
        rrset: &SignedRrset,
    ) -> Result<bool, DomainError> {
        if dnskey.algorithm != rrsig.algorithm
            || dnskey.calculate_key_tag() != rrsig.key_tag
        {
            return Ok(false);
        }

        let data = self.signed_data(rrsig, rrset)?;

        match rrsig.algorithm {
            5 | 7 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                &data,
                &rrsig.signature,
                dnskey,
            ),
            8 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
                &data,
                &rrsig.signature,
                dnskey,
            ),
            10 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
                &data,
                &rrsig.signature,
                dnskey,
            ),
            13 => self.verify_ecdsa(
                &signature::ECDSA_P256_SHA256_FIXED,
                32,
                &data,
                &rrsig.signature,
                dnskey,
            ),
            14 => self.verify_ecdsa(
                &signature::ECDSA_P384_SHA384_FIXED,
                48,
                &data,
                &rrsig.signature,
                dnskey,
            ),
            15 => self.verify_ed25519(&data, &rrsig.signature, dnskey),
            _ => Err(DomainError::InvalidDnsResponse(format!(
                "Unsupported DNSSEC algorithm: {}",
                rrsig.algorithm
            ))),
        }
    }

    /// Verify a DS (or DLV) record against a DNSKEY owned by `owner_name`
    pub fn verify_ds(
        &self,
        ds: &DsRecord,
        dnskey: &DnskeyRecord,
        owner_name: &str,
    ) -> Result<bool, DomainError> {
        if dnskey.calculate_key_tag() != ds.key_tag || dnskey.algorithm != ds.algorithm {
            return Ok(false);
        }

        let computed = self.ds_digest(dnskey, owner_name, ds.digest_type)?;
        Ok(computed == ds.digest)
    }

    /// Digest of owner name + DNSKEY RDATA (RFC 4034 5.1.4)
    pub fn ds_digest(
        &self,
        dnskey: &DnskeyRecord,
        owner_name: &str,
        digest_type: u8,
    ) -> Result<Vec<u8>, DomainError> {
        let mut data = name::to_wire(owner_name)?;
        data.extend_from_slice(&dnskey.to_rdata());

        match digest_type {
            1 => Ok(Sha1::digest(&data).to_vec()),
            2 => Ok(Sha256::digest(&data).to_vec()),
            4 => Ok(Sha384::digest(&data).to_vec()),
            _ => Err(DomainError::InvalidDnsResponse(format!(
                "Unsupported DS digest type: {}",
                digest_type
            ))),
        }
    }

    /// Build the data covered by an RRSIG (RFC 4034 3.1.8.1)
    ///
    /// ```text
    /// RRSIG_RDATA (without signature) + RR(1) + RR(2) + ...
    /// RR(i) = owner | type | class | original TTL | RDLENGTH | RDATA
    /// ```
    ///
    /// RRs are sorted by canonical RDATA. When the RRSIG labels field is
    /// smaller than the owner's label count the owner was synthesized from a
    /// wildcard and `*.<closest labels>` is signed instead.
    pub fn signed_data(
        &self,
        rrsig: &RrsigRecord,
        rrset: &SignedRrset,
    ) -> Result<Vec<u8>, DomainError> {
        let mut data = rrsig.signed_prefix()?;

        let owner_labels = name::label_count(&rrset.name);
        let owner = if usize::from(rrsig.labels) < owner_labels {
            name::prepend("*", &name::suffix(&rrset.name, usize::from(rrsig.labels)))
        } else {
            rrset.name.clone()
        };
        let owner_wire = name::to_wire(&owner)?;

        let mut rdatas: Vec<&[u8]> = rrset.records.iter().map(|r| r.rdata.as_slice()).collect();
        rdatas.sort_unstable();
        rdatas.dedup();

        for rdata in rdatas {
            let rdlength = u16::try_from(rdata.len()).map_err(|_| {
                DomainError::InvalidDnsResponse("RDATA exceeds 65535 bytes".into())
            })?;
            data.extend_from_slice(&owner_wire);
            data.extend_from_slice(&rrset.record_type.to_u16().to_be_bytes());
            data.extend_from_slice(&rrset.class.to_be_bytes());
            data.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
            data.extend_from_slice(&rdlength.to_be_bytes());
            data.extend_from_slice(rdata);
        }

        Ok(data)
    }

    /// RSA PKCS#1 v1.5 (Algorithms 5, 7, 8, 10)
    fn verify_rsa(
        &self,
        params: &'static signature::RsaParameters,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        let (exponent, modulus) = self.parse_rsa_key(&dnskey.public_key)?;

        let public_key = signature::RsaPublicKeyComponents {
            n: modulus,
            e: exponent,
        };

        Ok(public_key.verify(params, data, sig).is_ok())
    }

    /// ECDSA with fixed-size r|s signatures (Algorithms 13, 14)
    ///
    /// DNSKEY carries the bare X|Y point; ring wants the SEC1 uncompressed
    /// encoding with its 0x04 prefix.
    fn verify_ecdsa(
        &self,
        alg: &'static signature::EcdsaVerificationAlgorithm,
        coordinate_len: usize,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        if dnskey.public_key.len() != coordinate_len * 2 {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Invalid ECDSA public key length: {}",
                dnskey.public_key.len()
            )));
        }
        if sig.len() != coordinate_len * 2 {
            return Ok(false);
        }

        let mut point = Vec::with_capacity(1 + dnskey.public_key.len());
        point.push(0x04);
        point.extend_from_slice(&dnskey.public_key);

        let public_key = signature::UnparsedPublicKey::new(alg, &point);
        Ok(public_key.verify(data, sig).is_ok())
    }

    /// Verify Ed25519 signature (Algorithm 15)
    fn verify_ed25519(
        &self,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        if dnskey.public_key.len() != 32 {
            return Err(DomainError::InvalidDnsResponse(
                "Invalid Ed25519 public key length".into(),
            ));
        }
        if sig.len() != 64 {
            return Ok(false);
        }

        let public_key = signature::UnparsedPublicKey::new(&signature::ED25519, &dnskey.public_key);
        Ok(public_key.verify(data, sig).is_ok())
    }

    /// Parse RSA public key from DNSKEY format (RFC 3110)
    ///
    /// ## Format
    /// - If exponent length fits in 1 byte:
    ///   - 1 byte: exponent length
    ///   - N bytes: exponent
    ///   - Remaining: modulus
    /// - If exponent length needs 3 bytes:
    ///   - 1 byte: 0x00
    ///   - 2 bytes: exponent length
    ///   - N bytes: exponent
    ///   - Remaining: modulus
    fn parse_rsa_key<'a>(&self, key_data: &'a [u8]) -> Result<(&'a [u8], &'a [u8]), DomainError> {
        let first_byte = *key_data
            .first()
            .ok_or_else(|| DomainError::InvalidDnsResponse("Empty RSA public key".into()))?;

        let (exp_len, exp_start) = if first_byte == 0 {
            if key_data.len() < 3 {
                return Err(DomainError::InvalidDnsResponse(
                    "RSA key too short for long form".into(),
                ));
            }
            (usize::from(u16::from_be_bytes([key_data[1], key_data[2]])), 3)
        } else {
            (usize::from(first_byte), 1)
        };

        let exp_end = exp_start + exp_len;
        if exp_end >= key_data.len() {
            return Err(DomainError::InvalidDnsResponse(
                "RSA exponent extends beyond key data".into(),
            ));
        }

        Ok((&key_data[exp_start..exp_end], &key_data[exp_end..]))
    }
}
